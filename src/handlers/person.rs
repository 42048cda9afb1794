use crate::handlers::{current_user_id, merge_awards};
use crate::models::*;
use crate::services::{AchievementTriggers, PersonService, RecommendationService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/persons",
    tag = "person",
    request_body = CreatePersonRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Person created; includes newly earned achievements", body = PersonResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_person(
    person_service: web::Data<PersonService>,
    triggers: web::Data<AchievementTriggers>,
    req: HttpRequest,
    request: web::Json<CreatePersonRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let person = person_service
        .create_person(user_id, request.into_inner())
        .await?;

    let awarded = merge_awards([
        triggers.award_first_person(user_id).await?,
        triggers.check_profile_achievements(person.id).await?,
    ]);
    Ok(ApiResponse::created(WithAchievements::new(person, awarded)))
}

#[utoipa::path(
    get,
    path = "/api/persons",
    tag = "person",
    params(
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("page_size" = Option<i64>, Query, description = "Items per page, max 100"),
        ("q" = Option<String>, Query, description = "Name search")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Directory page"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_persons(
    person_service: web::Data<PersonService>,
    query: web::Query<PersonQuery>,
) -> Result<HttpResponse> {
    match person_service.list_persons(query.into_inner()).await {
        Ok(page) => Ok(ApiResponse::ok(page)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/persons/mine",
    tag = "person",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Persons owned by the caller", body = [PersonSummary])
    )
)]
pub async fn list_my_persons(
    person_service: web::Data<PersonService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    match person_service.list_my_persons(user_id).await {
        Ok(list) => Ok(ApiResponse::ok(list)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/persons/{id}",
    tag = "person",
    params(("id" = i64, Path, description = "Person id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Person with contacts visible to the caller", body = PersonResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_person(
    person_service: web::Data<PersonService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    match person_service.get_person(user_id, path.into_inner()).await {
        Ok(person) => Ok(ApiResponse::ok(person)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/persons/{id}",
    tag = "person",
    params(("id" = i64, Path, description = "Person id")),
    request_body = UpdatePersonRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated; includes newly earned achievements", body = PersonResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_person(
    person_service: web::Data<PersonService>,
    triggers: web::Data<AchievementTriggers>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePersonRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let person_id = path.into_inner();
    let person = person_service
        .update_person(user_id, person_id, request.into_inner())
        .await?;

    let awarded = merge_awards([
        triggers.check_profile_achievements(person_id).await?,
        triggers.check_active_member_achievement(person_id).await?,
    ]);
    Ok(ApiResponse::ok(WithAchievements::new(person, awarded)))
}

#[utoipa::path(
    delete,
    path = "/api/persons/{id}",
    tag = "person",
    params(("id" = i64, Path, description = "Person id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_person(
    person_service: web::Data<PersonService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    match person_service.delete_person(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Person deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/persons/{id}/contacts",
    tag = "person",
    params(("id" = i64, Path, description = "Person id")),
    request_body = CreateContactRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Contact added; includes newly earned achievements", body = ContactInfoResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn add_contact(
    person_service: web::Data<PersonService>,
    triggers: web::Data<AchievementTriggers>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<CreateContactRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let person_id = path.into_inner();
    let contact = person_service
        .add_contact(user_id, person_id, request.into_inner())
        .await?;

    let awarded = merge_awards([
        triggers.check_profile_achievements(person_id).await?,
        triggers.check_privacy_achievements(person_id).await?,
        triggers.check_active_member_achievement(person_id).await?,
    ]);
    Ok(ApiResponse::created(WithAchievements::new(contact, awarded)))
}

#[utoipa::path(
    delete,
    path = "/api/persons/{id}/contacts/{contact_id}",
    tag = "person",
    params(
        ("id" = i64, Path, description = "Person id"),
        ("contact_id" = i64, Path, description = "Contact id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Contact removed"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_contact(
    person_service: web::Data<PersonService>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let (person_id, contact_id) = path.into_inner();
    match person_service
        .delete_contact(user_id, person_id, contact_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Contact removed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/persons/{id}/interests",
    tag = "person",
    params(("id" = i64, Path, description = "Person id")),
    request_body = AddInterestRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Interest added; includes newly earned achievements", body = InterestResponse),
        (status = 400, description = "Invalid name"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn add_interest(
    person_service: web::Data<PersonService>,
    triggers: web::Data<AchievementTriggers>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AddInterestRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let person_id = path.into_inner();
    let interest = person_service
        .add_interest(user_id, person_id, request.into_inner())
        .await?;

    let awarded = merge_awards([
        triggers.check_profile_achievements(person_id).await?,
        triggers.check_active_member_achievement(person_id).await?,
    ]);
    Ok(ApiResponse::created(WithAchievements::new(interest, awarded)))
}

#[utoipa::path(
    delete,
    path = "/api/persons/{id}/interests/{interest_id}",
    tag = "person",
    params(
        ("id" = i64, Path, description = "Person id"),
        ("interest_id" = i64, Path, description = "Interest id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Interest removed"),
        (status = 404, description = "Not found")
    )
)]
pub async fn remove_interest(
    person_service: web::Data<PersonService>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let (person_id, interest_id) = path.into_inner();
    match person_service
        .remove_interest(user_id, person_id, interest_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Interest removed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/persons/{id}/similar",
    tag = "person",
    params(
        ("id" = i64, Path, description = "One of the caller's persons"),
        ("limit" = Option<u64>, Query, description = "Max results, default 10")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Persons ranked by shared interests", body = [SimilarPersonResponse]),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn similar_persons(
    recommendation_service: web::Data<RecommendationService>,
    triggers: web::Data<AchievementTriggers>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<RecommendationQuery>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let persons = recommendation_service
        .similar_persons(user_id, path.into_inner(), query.limit)
        .await?;

    let awarded = if persons.is_empty() {
        Vec::new()
    } else {
        triggers.check_similar_person_achievement(user_id).await?
    };
    Ok(ApiResponse::ok(json!({
        "persons": persons,
        "new_achievements": awarded
    })))
}

#[utoipa::path(
    get,
    path = "/api/persons/{id}/nearby",
    tag = "person",
    params(
        ("id" = i64, Path, description = "One of the caller's persons"),
        ("limit" = Option<u64>, Query, description = "Max results, default 10")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Persons in the same city", body = [PersonSummary]),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn nearby_persons(
    recommendation_service: web::Data<RecommendationService>,
    triggers: web::Data<AchievementTriggers>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<RecommendationQuery>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let persons = recommendation_service
        .nearby_persons(user_id, path.into_inner(), query.limit)
        .await?;

    let awarded = if persons.is_empty() {
        Vec::new()
    } else {
        triggers.award_nearby_discovery(user_id).await?
    };
    Ok(ApiResponse::ok(json!({
        "persons": persons,
        "new_achievements": awarded
    })))
}

pub fn person_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/persons")
            .route("", web::get().to(list_persons))
            .route("", web::post().to(create_person))
            // before /{id}
            .route("/mine", web::get().to(list_my_persons))
            .route("/{id}", web::get().to(get_person))
            .route("/{id}", web::put().to(update_person))
            .route("/{id}", web::delete().to(delete_person))
            .route("/{id}/contacts", web::post().to(add_contact))
            .route(
                "/{id}/contacts/{contact_id}",
                web::delete().to(delete_contact),
            )
            .route("/{id}/interests", web::post().to(add_interest))
            .route(
                "/{id}/interests/{interest_id}",
                web::delete().to(remove_interest),
            )
            .route("/{id}/similar", web::get().to(similar_persons))
            .route("/{id}/nearby", web::get().to(nearby_persons)),
    );
}
