use crate::entities::group_entity as groups;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    /// Person that becomes the group's first admin
    pub person_id: i64,
    #[schema(example = "Book Club")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupMembershipRequest {
    pub person_id: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

impl GroupResponse {
    pub fn new(m: groups::Model, member_count: i64) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            created_by: m.created_by,
            member_count,
            created_at: m.created_at,
        }
    }
}
