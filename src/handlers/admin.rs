use crate::handlers::current_user_id;
use crate::models::*;
use crate::services::{AdminService, GamificationService};
use actix_web::{HttpRequest, HttpResponse, Result, web};

async fn require_admin(admin_service: &AdminService, req: &HttpRequest) -> Result<i64> {
    let user_id = current_user_id(req)?;
    admin_service.ensure_admin(user_id).await?;
    Ok(user_id)
}

#[utoipa::path(
    get,
    path = "/api/admin/achievements",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All achievements, including inactive", body = [AchievementResponse]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_achievements(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_admin(&admin_service, &req).await?;
    Ok(ApiResponse::ok(admin_service.list_all_achievements().await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/achievements/{key}",
    tag = "admin",
    params(("key" = String, Path, description = "Achievement key")),
    request_body = UpdateAchievementRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated", body = AchievementResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Unknown key")
    )
)]
pub async fn update_achievement(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<UpdateAchievementRequest>,
) -> Result<HttpResponse> {
    require_admin(&admin_service, &req).await?;
    let updated = admin_service
        .update_achievement(&path.into_inner(), request.into_inner())
        .await?;
    Ok(ApiResponse::ok(updated))
}

#[utoipa::path(
    post,
    path = "/api/admin/levels",
    tag = "admin",
    request_body = CreateLevelRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Level created", body = LevelResponse),
        (status = 400, description = "Threshold breaks the ladder ordering"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_level(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    request: web::Json<CreateLevelRequest>,
) -> Result<HttpResponse> {
    require_admin(&admin_service, &req).await?;
    let level = admin_service.create_level(request.into_inner()).await?;
    Ok(ApiResponse::created(level))
}

#[utoipa::path(
    put,
    path = "/api/admin/levels/{level_number}",
    tag = "admin",
    params(("level_number" = i32, Path, description = "Level number")),
    request_body = UpdateLevelRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Level updated", body = LevelResponse),
        (status = 400, description = "Threshold breaks the ladder ordering"),
        (status = 404, description = "Unknown level")
    )
)]
pub async fn update_level(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateLevelRequest>,
) -> Result<HttpResponse> {
    require_admin(&admin_service, &req).await?;
    let level = admin_service
        .update_level(path.into_inner(), request.into_inner())
        .await?;
    Ok(ApiResponse::ok(level))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/points",
    tag = "admin",
    params(("id" = i64, Path, description = "User id")),
    request_body = AdjustPointsRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Ledger entry written", body = PointTransactionResponse),
        (status = 400, description = "Zero delta or bad reason"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn adjust_points(
    admin_service: web::Data<AdminService>,
    gamification_service: web::Data<GamificationService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AdjustPointsRequest>,
) -> Result<HttpResponse> {
    let admin_id = require_admin(&admin_service, &req).await?;
    let target = path.into_inner();
    let entry = gamification_service
        .adjust_points(target, request.points, &request.reason)
        .await?;
    log::info!("Admin {admin_id} adjusted points of user {target}");
    Ok(ApiResponse::created(entry))
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/achievements", web::get().to(list_achievements))
            .route("/achievements/{key}", web::put().to(update_achievement))
            .route("/levels", web::post().to(create_level))
            .route("/levels/{level_number}", web::put().to(update_level))
            .route("/users/{id}/points", web::post().to(adjust_points)),
    );
}
