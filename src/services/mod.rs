pub mod achievement_triggers;
pub mod admin_service;
pub mod auth_service;
pub mod gamification_service;
pub mod group_service;
pub mod person_service;
pub mod rate_limiter;
pub mod recommendation_service;

pub use achievement_triggers::AchievementTriggers;
pub use admin_service::*;
pub use auth_service::*;
pub use gamification_service::*;
pub use group_service::*;
pub use person_service::*;
pub use rate_limiter::*;
pub use recommendation_service::RecommendationService;
