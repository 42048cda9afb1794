use crate::entities::{
    ContactType, Privacy, contact_info_entity as contacts, interest_entity as interests,
    person_entity as persons,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePersonRequest {
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: Option<String>,
    #[schema(example = "she/her")]
    pub pronouns: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    #[schema(example = "London")]
    pub city: Option<String>,
}

/// Omitted fields are left alone; an empty string clears an optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePersonRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub pronouns: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    pub contact_type: ContactType,
    #[schema(example = "+44 20 7946 0000")]
    pub value: String,
    /// Defaults to private
    pub privacy: Option<Privacy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddInterestRequest {
    #[schema(example = "Mathematics")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PersonQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Case-insensitive match on first or last name
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactInfoResponse {
    pub id: i64,
    pub contact_type: ContactType,
    pub value: String,
    pub privacy: Privacy,
}

impl From<contacts::Model> for ContactInfoResponse {
    fn from(m: contacts::Model) -> Self {
        Self {
            id: m.id,
            contact_type: m.contact_type,
            value: m.value,
            privacy: m.privacy,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InterestResponse {
    pub id: i64,
    pub name: String,
}

impl From<interests::Model> for InterestResponse {
    fn from(m: interests::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PersonSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub pronouns: Option<String>,
    pub photo_url: Option<String>,
    pub city: Option<String>,
}

impl From<persons::Model> for PersonSummary {
    fn from(m: persons::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            pronouns: m.pronouns,
            photo_url: m.photo_url,
            city: m.city,
        }
    }
}

/// Full profile; `contacts` is already filtered for the viewer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PersonResponse {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub pronouns: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub contacts: Vec<ContactInfoResponse>,
    pub interests: Vec<InterestResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersonResponse {
    pub fn new(
        m: persons::Model,
        contacts: Vec<ContactInfoResponse>,
        interests: Vec<InterestResponse>,
    ) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            first_name: m.first_name,
            last_name: m.last_name,
            pronouns: m.pronouns,
            photo_url: m.photo_url,
            bio: m.bio,
            city: m.city,
            contacts,
            interests,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SimilarPersonResponse {
    pub person: PersonSummary,
    /// Cosine similarity of the two interest sets, 0..=1
    pub similarity: f64,
    pub shared_interests: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RecommendationQuery {
    /// 1..=50, default 10
    pub limit: Option<u64>,
}
