pub mod admin;
pub mod auth;
pub mod gamification;
pub mod group;
pub mod person;

pub use admin::admin_config;
pub use auth::auth_config;
pub use gamification::gamification_config;
pub use group::group_config;
pub use person::person_config;

use crate::error::{AppError, AppResult};
use actix_web::{HttpMessage, HttpRequest, web};

/// JSON extractor config; malformed bodies get the standard error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid JSON body: {err}")).into()
    })
}

/// User id placed in the request extensions by `AuthMiddleware`.
pub(crate) fn current_user_id(req: &HttpRequest) -> AppResult<i64> {
    req.extensions()
        .get::<i64>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

/// Flattens trigger results, keeping first-seen order.
pub(crate) fn merge_awards(batches: impl IntoIterator<Item = Vec<String>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for key in batches.into_iter().flatten() {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}
