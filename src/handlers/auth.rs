use crate::handlers::current_user_id;
use crate::models::*;
use crate::services::{AchievementTriggers, AuthService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/auth/magic-link",
    tag = "auth",
    request_body = MagicLinkRequest,
    responses(
        (status = 200, description = "Sign-in link sent", body = MagicLinkResponse),
        (status = 400, description = "Invalid email"),
        (status = 429, description = "Too many requests for this email")
    )
)]
pub async fn request_magic_link(
    auth_service: web::Data<AuthService>,
    request: web::Json<MagicLinkRequest>,
) -> Result<HttpResponse> {
    match auth_service.request_magic_link(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            response,
            "Check your inbox for a sign-in link",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/verify",
    tag = "auth",
    request_body = VerifyMagicLinkRequest,
    responses(
        (status = 200, description = "Signed in; includes newly earned achievements", body = AuthResponse),
        (status = 401, description = "Link invalid, expired or already used")
    )
)]
pub async fn verify_magic_link(
    auth_service: web::Data<AuthService>,
    triggers: web::Data<AchievementTriggers>,
    request: web::Json<VerifyMagicLinkRequest>,
) -> Result<HttpResponse> {
    let login = match auth_service.verify_magic_link(request.into_inner()).await {
        Ok(login) => login,
        Err(e) => return Ok(e.error_response()),
    };
    match triggers.award_email_verified(login.user_id).await {
        Ok(awarded) => Ok(ApiResponse::ok(WithAchievements::new(login.response, awarded))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshTokenResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    match auth_service.refresh_token(request.into_inner()).await {
        Ok(response) => Ok(ApiResponse::ok(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me(auth_service: web::Data<AuthService>, req: HttpRequest) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    match auth_service.me(user_id).await {
        Ok(user) => Ok(ApiResponse::ok(user)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/magic-link", web::post().to(request_magic_link))
            .route("/verify", web::post().to(verify_magic_link))
            .route("/refresh", web::post().to(refresh))
            .route("/me", web::get().to(me)),
    );
}
