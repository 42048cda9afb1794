use crate::handlers::{current_user_id, merge_awards};
use crate::models::*;
use crate::services::{AchievementTriggers, GroupService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/groups",
    tag = "group",
    request_body = CreateGroupRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Group created; includes newly earned achievements", body = GroupResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Person not owned by caller")
    )
)]
pub async fn create_group(
    group_service: web::Data<GroupService>,
    triggers: web::Data<AchievementTriggers>,
    req: HttpRequest,
    request: web::Json<CreateGroupRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let request = request.into_inner();
    let person_id = request.person_id;
    let group = group_service.create_group(user_id, request).await?;

    let awarded = merge_awards([
        triggers.award_group_create(user_id).await?,
        triggers.check_group_achievements(person_id).await?,
        triggers.check_active_member_achievement(person_id).await?,
    ]);
    Ok(ApiResponse::created(WithAchievements::new(group, awarded)))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    tag = "group",
    params(
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("page_size" = Option<i64>, Query, description = "Items per page, max 100")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active groups")
    )
)]
pub async fn list_groups(
    group_service: web::Data<GroupService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match group_service.list_groups(&query).await {
        Ok(page) => Ok(ApiResponse::ok(page)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/groups/{id}/join",
    tag = "group",
    params(("id" = i64, Path, description = "Group id")),
    request_body = GroupMembershipRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Joined; includes newly earned achievements", body = GroupResponse),
        (status = 404, description = "Group or person not found")
    )
)]
pub async fn join_group(
    group_service: web::Data<GroupService>,
    triggers: web::Data<AchievementTriggers>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<GroupMembershipRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let person_id = request.person_id;
    let group = group_service
        .join_group(user_id, path.into_inner(), person_id)
        .await?;

    let awarded = merge_awards([
        triggers.check_group_achievements(person_id).await?,
        triggers.check_active_member_achievement(person_id).await?,
    ]);
    Ok(ApiResponse::ok(WithAchievements::new(group, awarded)))
}

#[utoipa::path(
    post,
    path = "/api/groups/{id}/leave",
    tag = "group",
    params(("id" = i64, Path, description = "Group id")),
    request_body = GroupMembershipRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Left the group"),
        (status = 404, description = "Not a member")
    )
)]
pub async fn leave_group(
    group_service: web::Data<GroupService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<GroupMembershipRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    match group_service
        .leave_group(user_id, path.into_inner(), request.person_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Left group"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    tag = "group",
    params(("id" = i64, Path, description = "Group id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Group deleted"),
        (status = 403, description = "Caller is not a group admin"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_group(
    group_service: web::Data<GroupService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    match group_service.delete_group(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Group deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn group_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/groups")
            .route("", web::get().to(list_groups))
            .route("", web::post().to(create_group))
            .route("/{id}", web::delete().to(delete_group))
            .route("/{id}/join", web::post().to(join_group))
            .route("/{id}/leave", web::post().to(leave_group)),
    );
}
