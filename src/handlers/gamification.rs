use crate::error::{AppError, AppResult};
use crate::handlers::current_user_id;
use crate::models::*;
use crate::services::GamificationService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::Value;

/// `achievementKeys` must be an array of strings.
pub fn parse_achievement_keys(body: &Value) -> AppResult<Vec<String>> {
    let invalid = || AppError::ValidationError("achievementKeys must be an array of strings".to_string());
    body.get("achievementKeys")
        .and_then(Value::as_array)
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/gamification/achievements",
    tag = "gamification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Achievements with the caller's completion", body = [AchievementStatusResponse]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_achievements(
    gamification_service: web::Data<GamificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    match gamification_service.list_achievements_for_user(user_id).await {
        Ok(list) => Ok(ApiResponse::ok(list)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/gamification/stats",
    tag = "gamification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Points, level and progress", body = UserStatsResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_stats(
    gamification_service: web::Data<GamificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    match gamification_service.get_user_stats(user_id).await {
        Ok(stats) => Ok(ApiResponse::ok(stats)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/gamification/levels",
    tag = "gamification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Levels in ascending order", body = [LevelResponse])
    )
)]
pub async fn list_levels(gamification_service: web::Data<GamificationService>) -> Result<HttpResponse> {
    match gamification_service.list_levels().await {
        Ok(levels) => Ok(ApiResponse::ok(
            levels.into_iter().map(LevelResponse::from).collect::<Vec<_>>(),
        )),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/gamification/achievements/check",
    tag = "gamification",
    request_body = CheckAchievementsRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Keys newly awarded by this call", body = CheckAchievementsResponse),
        (status = 400, description = "achievementKeys is not an array of strings")
    )
)]
pub async fn check_achievements(
    gamification_service: web::Data<GamificationService>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let keys = parse_achievement_keys(&body)?;
    match gamification_service
        .check_and_award_multiple(user_id, &keys)
        .await
    {
        Ok(awarded) => Ok(ApiResponse::ok(CheckAchievementsResponse { awarded })),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/gamification/transactions",
    tag = "gamification",
    params(
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("page_size" = Option<i64>, Query, description = "Items per page, max 100")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Point ledger, newest first")
    )
)]
pub async fn list_transactions(
    gamification_service: web::Data<GamificationService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    match gamification_service
        .list_point_transactions(user_id, &query)
        .await
    {
        Ok(page) => Ok(ApiResponse::ok(page)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn gamification_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gamification")
            .route("/achievements", web::get().to(list_achievements))
            .route("/achievements/check", web::post().to(check_achievements))
            .route("/stats", web::get().to(get_stats))
            .route("/levels", web::get().to(list_levels))
            .route("/transactions", web::get().to(list_transactions)),
    );
}
