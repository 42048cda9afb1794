pub mod common;
pub mod gamification;
pub mod group;
pub mod pagination;
pub mod person;
pub mod user;

pub use common::*;
pub use gamification::*;
pub use group::*;
pub use pagination::*;
pub use person::*;
pub use user::*;
