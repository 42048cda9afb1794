use crate::entities::{
    Privacy, contact_info_entity as contacts, interest_entity as interests,
    person_entity as persons, person_interest_entity as person_interests,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::sea_query::{Condition, Expr, Func, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

const MAX_NAME_LEN: usize = 100;
const MAX_CONTACT_LEN: usize = 255;
const MAX_INTEREST_LEN: usize = 100;

/// Trims and drops empty strings.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_len(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn required_first_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError(
            "First name is required".to_string(),
        ));
    }
    check_len("First name", name, MAX_NAME_LEN)?;
    Ok(name.to_string())
}

/// Interest names are stored trimmed, lowercased and with inner whitespace collapsed.
pub fn normalize_interest_name(raw: &str) -> AppResult<String> {
    let name = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if name.is_empty() {
        return Err(AppError::ValidationError(
            "Interest name is required".to_string(),
        ));
    }
    check_len("Interest name", &name, MAX_INTEREST_LEN)?;
    Ok(name)
}

/// Contacts a viewer may see. Owners see everything.
pub fn visible_to(privacy: Privacy, is_owner: bool) -> bool {
    is_owner || privacy != Privacy::Private
}

#[derive(Clone)]
pub struct PersonService {
    pool: DatabaseConnection,
}

impl PersonService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Active person or 404.
    pub async fn find_active(&self, person_id: i64) -> AppResult<persons::Model> {
        persons::Entity::find_by_id(person_id)
            .filter(persons::Column::DeletedAt.is_null())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Person not found".to_string()))
    }

    /// Active person owned by `user_id`; 404 when missing, 403 when owned by someone else.
    pub async fn find_owned(&self, user_id: i64, person_id: i64) -> AppResult<persons::Model> {
        let person = self.find_active(person_id).await?;
        if person.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        Ok(person)
    }

    pub async fn create_person(
        &self,
        user_id: i64,
        request: CreatePersonRequest,
    ) -> AppResult<PersonResponse> {
        let first_name = required_first_name(&request.first_name)?;
        let last_name = clean(request.last_name);
        let pronouns = clean(request.pronouns);
        let city = clean(request.city);
        for (field, value) in [("Last name", &last_name), ("Pronouns", &pronouns), ("City", &city)] {
            if let Some(v) = value {
                check_len(field, v, MAX_NAME_LEN)?;
            }
        }

        let now = Utc::now();
        let person = persons::ActiveModel {
            user_id: Set(user_id),
            first_name: Set(first_name),
            last_name: Set(last_name),
            pronouns: Set(pronouns),
            photo_url: Set(clean(request.photo_url)),
            bio: Set(clean(request.bio)),
            city: Set(city),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Person {} created by user {user_id}", person.id);
        Ok(PersonResponse::new(person, Vec::new(), Vec::new()))
    }

    pub async fn get_person(&self, viewer_id: i64, person_id: i64) -> AppResult<PersonResponse> {
        let person = self.find_active(person_id).await?;
        self.to_response(person, viewer_id).await
    }

    async fn to_response(
        &self,
        person: persons::Model,
        viewer_id: i64,
    ) -> AppResult<PersonResponse> {
        let is_owner = person.user_id == viewer_id;

        let contact_list = contacts::Entity::find()
            .filter(contacts::Column::PersonId.eq(person.id))
            .filter(contacts::Column::DeletedAt.is_null())
            .order_by_asc(contacts::Column::Id)
            .all(&self.pool)
            .await?
            .into_iter()
            .filter(|c| visible_to(c.privacy, is_owner))
            .map(ContactInfoResponse::from)
            .collect();

        let interest_ids: Vec<i64> = person_interests::Entity::find()
            .filter(person_interests::Column::PersonId.eq(person.id))
            .filter(person_interests::Column::DeletedAt.is_null())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|pi| pi.interest_id)
            .collect();

        let interest_list = if interest_ids.is_empty() {
            Vec::new()
        } else {
            interests::Entity::find()
                .filter(interests::Column::Id.is_in(interest_ids))
                .order_by_asc(interests::Column::Name)
                .all(&self.pool)
                .await?
                .into_iter()
                .map(InterestResponse::from)
                .collect()
        };

        Ok(PersonResponse::new(person, contact_list, interest_list))
    }

    pub async fn update_person(
        &self,
        user_id: i64,
        person_id: i64,
        request: UpdatePersonRequest,
    ) -> AppResult<PersonResponse> {
        let person = self.find_owned(user_id, person_id).await?;
        let mut active: persons::ActiveModel = person.into();

        if let Some(first_name) = request.first_name {
            active.first_name = Set(required_first_name(&first_name)?);
        }
        // Some("") clears the field
        if request.last_name.is_some() {
            let v = clean(request.last_name);
            if let Some(s) = &v {
                check_len("Last name", s, MAX_NAME_LEN)?;
            }
            active.last_name = Set(v);
        }
        if request.pronouns.is_some() {
            let v = clean(request.pronouns);
            if let Some(s) = &v {
                check_len("Pronouns", s, MAX_NAME_LEN)?;
            }
            active.pronouns = Set(v);
        }
        if request.photo_url.is_some() {
            active.photo_url = Set(clean(request.photo_url));
        }
        if request.bio.is_some() {
            active.bio = Set(clean(request.bio));
        }
        if request.city.is_some() {
            let v = clean(request.city);
            if let Some(s) = &v {
                check_len("City", s, MAX_NAME_LEN)?;
            }
            active.city = Set(v);
        }
        active.updated_at = Set(Utc::now());

        let person = active.update(&self.pool).await?;
        self.to_response(person, user_id).await
    }

    pub async fn delete_person(&self, user_id: i64, person_id: i64) -> AppResult<()> {
        let person = self.find_owned(user_id, person_id).await?;
        let now = Utc::now();
        let mut active: persons::ActiveModel = person.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.pool).await?;
        log::info!("Person {person_id} deleted by user {user_id}");
        Ok(())
    }

    pub async fn list_my_persons(&self, user_id: i64) -> AppResult<Vec<PersonSummary>> {
        Ok(persons::Entity::find()
            .filter(persons::Column::UserId.eq(user_id))
            .filter(persons::Column::DeletedAt.is_null())
            .order_by_asc(persons::Column::Id)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(PersonSummary::from)
            .collect())
    }

    /// Directory listing, optionally filtered by name.
    pub async fn list_persons(&self, query: PersonQuery) -> AppResult<PaginatedResponse<PersonSummary>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let mut base_query = persons::Entity::find().filter(persons::Column::DeletedAt.is_null());
        if let Some(q) = clean(query.q) {
            let pattern = format!("%{}%", q.to_lowercase());
            base_query = base_query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(persons::Column::FirstName)))
                            .like(pattern.as_str()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(persons::Column::LastName)))
                            .like(pattern.as_str()),
                    ),
            );
        }

        let total = base_query.clone().count(&self.pool).await? as i64;
        let items = base_query
            .order_by_asc(persons::Column::FirstName)
            .order_by_asc(persons::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(PersonSummary::from)
            .collect();

        Ok(PaginatedResponse::from_params(items, &params, total))
    }

    pub async fn add_contact(
        &self,
        user_id: i64,
        person_id: i64,
        request: CreateContactRequest,
    ) -> AppResult<ContactInfoResponse> {
        self.find_owned(user_id, person_id).await?;

        let value = request.value.trim();
        if value.is_empty() {
            return Err(AppError::ValidationError(
                "Contact value is required".to_string(),
            ));
        }
        check_len("Contact value", value, MAX_CONTACT_LEN)?;

        let contact = contacts::ActiveModel {
            person_id: Set(person_id),
            contact_type: Set(request.contact_type),
            value: Set(value.to_string()),
            privacy: Set(request.privacy.unwrap_or(Privacy::Private)),
            deleted_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(contact.into())
    }

    pub async fn delete_contact(
        &self,
        user_id: i64,
        person_id: i64,
        contact_id: i64,
    ) -> AppResult<()> {
        self.find_owned(user_id, person_id).await?;

        let contact = contacts::Entity::find_by_id(contact_id)
            .filter(contacts::Column::PersonId.eq(person_id))
            .filter(contacts::Column::DeletedAt.is_null())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))?;

        let mut active: contacts::ActiveModel = contact.into();
        active.deleted_at = Set(Some(Utc::now()));
        active.update(&self.pool).await?;
        Ok(())
    }

    /// Interest row for `name`, created on first use.
    async fn find_or_create_interest(&self, name: &str) -> AppResult<interests::Model> {
        interests::Entity::insert(interests::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(interests::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;

        interests::Entity::find()
            .filter(interests::Column::Name.eq(name))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError(format!("Interest {name} missing after insert")))
    }

    /// Adding an interest the person already has is a no-op; a removed one is restored.
    pub async fn add_interest(
        &self,
        user_id: i64,
        person_id: i64,
        request: AddInterestRequest,
    ) -> AppResult<InterestResponse> {
        self.find_owned(user_id, person_id).await?;
        let name = normalize_interest_name(&request.name)?;
        let interest = self.find_or_create_interest(&name).await?;

        let existing = person_interests::Entity::find()
            .filter(person_interests::Column::PersonId.eq(person_id))
            .filter(person_interests::Column::InterestId.eq(interest.id))
            .one(&self.pool)
            .await?;

        match existing {
            Some(link) if link.deleted_at.is_none() => {}
            Some(link) => {
                let mut active: person_interests::ActiveModel = link.into();
                active.deleted_at = Set(None);
                active.update(&self.pool).await?;
            }
            None => {
                person_interests::ActiveModel {
                    person_id: Set(person_id),
                    interest_id: Set(interest.id),
                    deleted_at: Set(None),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await?;
            }
        }

        Ok(interest.into())
    }

    pub async fn remove_interest(
        &self,
        user_id: i64,
        person_id: i64,
        interest_id: i64,
    ) -> AppResult<()> {
        self.find_owned(user_id, person_id).await?;

        let link = person_interests::Entity::find()
            .filter(person_interests::Column::PersonId.eq(person_id))
            .filter(person_interests::Column::InterestId.eq(interest_id))
            .filter(person_interests::Column::DeletedAt.is_null())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Interest not found on this person".to_string()))?;

        let mut active: person_interests::ActiveModel = link.into();
        active.deleted_at = Set(Some(Utc::now()));
        active.update(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_interest_name() {
        assert_eq!(
            normalize_interest_name("  Rock   Climbing ").unwrap(),
            "rock climbing"
        );
        assert!(normalize_interest_name("   ").is_err());
        assert!(normalize_interest_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_private_contacts_hidden_from_others() {
        assert!(visible_to(Privacy::Private, true));
        assert!(!visible_to(Privacy::Private, false));
        assert!(visible_to(Privacy::Members, false));
        assert!(visible_to(Privacy::Public, false));
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(clean(Some("   ".into())), None);
        assert_eq!(clean(None), None);
    }
}
