pub mod achievements;
pub mod contact_infos;
pub mod group_members;
pub mod groups;
pub mod interests;
pub mod levels;
pub mod magic_link_attempts;
pub mod magic_link_tokens;
pub mod person_interests;
pub mod persons;
pub mod point_transactions;
pub mod user_achievements;
pub mod users;

pub use achievements as achievement_entity;
pub use contact_infos as contact_info_entity;
pub use group_members as group_member_entity;
pub use groups as group_entity;
pub use interests as interest_entity;
pub use levels as level_entity;
pub use magic_link_attempts as magic_link_attempt_entity;
pub use magic_link_tokens as magic_link_token_entity;
pub use person_interests as person_interest_entity;
pub use persons as person_entity;
pub use point_transactions as point_transaction_entity;
pub use user_achievements as user_achievement_entity;
pub use users as user_entity;

pub use achievements::AchievementCategory;
pub use contact_infos::{ContactType, Privacy};
pub use group_members::GroupRole;
