use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{AchievementCategory, ContactType, GroupRole, Privacy};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::request_magic_link,
        handlers::auth::verify_magic_link,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::person::create_person,
        handlers::person::list_persons,
        handlers::person::list_my_persons,
        handlers::person::get_person,
        handlers::person::update_person,
        handlers::person::delete_person,
        handlers::person::add_contact,
        handlers::person::delete_contact,
        handlers::person::add_interest,
        handlers::person::remove_interest,
        handlers::person::similar_persons,
        handlers::person::nearby_persons,
        handlers::group::create_group,
        handlers::group::list_groups,
        handlers::group::join_group,
        handlers::group::leave_group,
        handlers::group::delete_group,
        handlers::gamification::list_achievements,
        handlers::gamification::get_stats,
        handlers::gamification::list_levels,
        handlers::gamification::check_achievements,
        handlers::gamification::list_transactions,
        handlers::admin::list_achievements,
        handlers::admin::update_achievement,
        handlers::admin::create_level,
        handlers::admin::update_level,
        handlers::admin::adjust_points,
    ),
    components(
        schemas(
            ApiError,
            UserResponse,
            MagicLinkRequest,
            MagicLinkResponse,
            VerifyMagicLinkRequest,
            RefreshTokenRequest,
            RefreshTokenResponse,
            AuthResponse,
            CreatePersonRequest,
            UpdatePersonRequest,
            CreateContactRequest,
            AddInterestRequest,
            ContactInfoResponse,
            InterestResponse,
            PersonSummary,
            PersonResponse,
            SimilarPersonResponse,
            ContactType,
            Privacy,
            CreateGroupRequest,
            GroupMembershipRequest,
            GroupResponse,
            GroupRole,
            AchievementCategory,
            AchievementResponse,
            AchievementStatusResponse,
            LevelResponse,
            UserStatsResponse,
            CheckAchievementsRequest,
            CheckAchievementsResponse,
            PointTransactionResponse,
            UpdateAchievementRequest,
            CreateLevelRequest,
            UpdateLevelRequest,
            AdjustPointsRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Magic-link sign-in"),
        (name = "person", description = "Directory entries, contacts and interests"),
        (name = "group", description = "Groups and memberships"),
        (name = "gamification", description = "Achievements, points and levels"),
        (name = "admin", description = "Achievement and level administration"),
    ),
    info(
        title = "Community Directory API",
        version = "0.1.0",
        description = "Community directory REST API with achievements and levels"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_gamification_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/gamification/achievements/check"));
        assert!(doc.paths.paths.contains_key("/api/auth/magic-link"));
    }
}
