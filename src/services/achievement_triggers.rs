//! Achievement triggers.
//!
//! After a mutation the handler asks the triggers to re-read the person's
//! current state and evaluate a fixed set of predicates. Keys whose
//! predicates hold are handed to [`GamificationService::check_and_award_multiple`],
//! which silently skips the ones already earned. Nothing is tracked between
//! calls: every check is a fresh evaluation of persisted state.

use crate::entities::{
    ContactType, GroupRole, Privacy, contact_info_entity as contacts,
    group_entity as groups, group_member_entity as group_members,
    person_entity as persons, person_interest_entity as person_interests,
};
use crate::error::AppResult;
use crate::services::GamificationService;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use std::collections::HashSet;

/// Stable achievement keys referenced from code.
pub mod keys {
    pub const FIRST_PERSON: &str = "first_person";
    pub const EMAIL_VERIFIED: &str = "email_verified";
    pub const PROFILE_BASICS: &str = "profile_basics";
    pub const PROFILE_PHOTO: &str = "profile_photo";
    pub const FIRST_INTEREST: &str = "first_interest";
    pub const INTERESTS_COMPLETE: &str = "interests_complete";
    pub const CONTACT_VARIETY: &str = "contact_variety";
    pub const PROFILE_COMPLETE: &str = "profile_complete";
    pub const PRIVACY_GUARDIAN: &str = "privacy_guardian";
    pub const PRIVACY_BALANCED: &str = "privacy_balanced";
    pub const FIRST_GROUP: &str = "first_group";
    pub const GROUP_ADMIN: &str = "group_admin";
    pub const GROUP_CREATE: &str = "group_create";
    pub const NEARBY_DISCOVERY: &str = "nearby_discovery";
    pub const SIMILAR_PERSON: &str = "similar_person";
    pub const ACTIVE_MEMBER: &str = "active_member";
}

pub const INTERESTS_COMPLETE_THRESHOLD: usize = 5;
pub const CONTACT_VARIETY_THRESHOLD: usize = 3;
pub const ACTIVE_MEMBER_GROUP_THRESHOLD: usize = 2;

/// Everything the predicates look at, already stripped of deleted rows.
#[derive(Debug, Clone, Default)]
pub struct PersonSnapshot {
    pub has_first_name: bool,
    pub has_last_name: bool,
    pub has_pronouns: bool,
    pub has_photo: bool,
    pub interest_count: usize,
    pub contacts: Vec<(ContactType, Privacy)>,
    /// Memberships in groups that are not deleted
    pub active_group_count: usize,
    pub admin_group_count: usize,
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

impl PersonSnapshot {
    pub fn from_person(person: &persons::Model) -> Self {
        Self {
            has_first_name: present(Some(&person.first_name)),
            has_last_name: present(person.last_name.as_deref()),
            has_pronouns: present(person.pronouns.as_deref()),
            has_photo: present(person.photo_url.as_deref()),
            ..Default::default()
        }
    }

    pub fn distinct_contact_types(&self) -> usize {
        self.contacts
            .iter()
            .map(|(t, _)| *t)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_profile_complete(&self) -> bool {
        self.has_first_name
            && self.has_pronouns
            && self.has_photo
            && self.interest_count >= INTERESTS_COMPLETE_THRESHOLD
            && self.distinct_contact_types() >= CONTACT_VARIETY_THRESHOLD
    }
}

pub fn profile_achievement_keys(s: &PersonSnapshot) -> Vec<&'static str> {
    let mut out = Vec::new();
    if s.has_first_name && s.has_last_name && s.has_pronouns {
        out.push(keys::PROFILE_BASICS);
    }
    if s.has_photo {
        out.push(keys::PROFILE_PHOTO);
    }
    if s.interest_count >= 1 {
        out.push(keys::FIRST_INTEREST);
    }
    if s.interest_count >= INTERESTS_COMPLETE_THRESHOLD {
        out.push(keys::INTERESTS_COMPLETE);
    }
    if s.distinct_contact_types() >= CONTACT_VARIETY_THRESHOLD {
        out.push(keys::CONTACT_VARIETY);
    }
    if s.is_profile_complete() {
        out.push(keys::PROFILE_COMPLETE);
    }
    out
}

pub fn privacy_achievement_keys(s: &PersonSnapshot) -> Vec<&'static str> {
    let mut out = Vec::new();
    let private_address = s
        .contacts
        .iter()
        .any(|(t, p)| *t == ContactType::Address && *p == Privacy::Private);
    if private_address {
        out.push(keys::PRIVACY_GUARDIAN);
    }
    let any_private = s.contacts.iter().any(|(_, p)| *p == Privacy::Private);
    let any_public = s.contacts.iter().any(|(_, p)| *p == Privacy::Public);
    if any_private && any_public {
        out.push(keys::PRIVACY_BALANCED);
    }
    out
}

pub fn group_achievement_keys(s: &PersonSnapshot) -> Vec<&'static str> {
    let mut out = Vec::new();
    if s.active_group_count >= 1 {
        out.push(keys::FIRST_GROUP);
    }
    if s.admin_group_count >= 1 {
        out.push(keys::GROUP_ADMIN);
    }
    out
}

pub fn active_member_achievement_keys(s: &PersonSnapshot) -> Vec<&'static str> {
    if s.is_profile_complete()
        && s.active_group_count >= ACTIVE_MEMBER_GROUP_THRESHOLD
        && s.interest_count >= INTERESTS_COMPLETE_THRESHOLD
    {
        vec![keys::ACTIVE_MEMBER]
    } else {
        Vec::new()
    }
}

fn to_owned_keys(keys: Vec<&'static str>) -> Vec<String> {
    keys.into_iter().map(str::to_string).collect()
}

#[derive(Clone)]
pub struct AchievementTriggers {
    pool: DatabaseConnection,
    gamification: GamificationService,
}

impl AchievementTriggers {
    pub fn new(pool: DatabaseConnection, gamification: GamificationService) -> Self {
        Self { pool, gamification }
    }

    /// Person plus its current state, or `None` when missing or soft deleted
    async fn load_snapshot(
        &self,
        person_id: i64,
    ) -> AppResult<Option<(persons::Model, PersonSnapshot)>> {
        let Some(person) = persons::Entity::find_by_id(person_id)
            .filter(persons::Column::DeletedAt.is_null())
            .one(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut snapshot = PersonSnapshot::from_person(&person);

        snapshot.contacts = contacts::Entity::find()
            .filter(contacts::Column::PersonId.eq(person_id))
            .filter(contacts::Column::DeletedAt.is_null())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.contact_type, c.privacy))
            .collect();

        snapshot.interest_count = person_interests::Entity::find()
            .filter(person_interests::Column::PersonId.eq(person_id))
            .filter(person_interests::Column::DeletedAt.is_null())
            .count(&self.pool)
            .await? as usize;

        let memberships = group_members::Entity::find()
            .filter(group_members::Column::PersonId.eq(person_id))
            .all(&self.pool)
            .await?;
        if !memberships.is_empty() {
            let active_group_ids: HashSet<i64> = groups::Entity::find()
                .filter(groups::Column::Id.is_in(memberships.iter().map(|m| m.group_id)))
                .filter(groups::Column::DeletedAt.is_null())
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|g| g.id)
                .collect();
            let active: Vec<_> = memberships
                .iter()
                .filter(|m| active_group_ids.contains(&m.group_id))
                .collect();
            snapshot.active_group_count = active.len();
            snapshot.admin_group_count =
                active.iter().filter(|m| m.role == GroupRole::Admin).count();
        }

        Ok(Some((person, snapshot)))
    }

    async fn evaluate(
        &self,
        person_id: i64,
        predicates: fn(&PersonSnapshot) -> Vec<&'static str>,
    ) -> AppResult<Vec<String>> {
        let Some((person, snapshot)) = self.load_snapshot(person_id).await? else {
            return Ok(Vec::new());
        };
        let candidates = to_owned_keys(predicates(&snapshot));
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        self.gamification
            .check_and_award_multiple(person.user_id, &candidates)
            .await
    }

    pub async fn check_profile_achievements(&self, person_id: i64) -> AppResult<Vec<String>> {
        self.evaluate(person_id, profile_achievement_keys).await
    }

    pub async fn check_privacy_achievements(&self, person_id: i64) -> AppResult<Vec<String>> {
        self.evaluate(person_id, privacy_achievement_keys).await
    }

    pub async fn check_group_achievements(&self, person_id: i64) -> AppResult<Vec<String>> {
        self.evaluate(person_id, group_achievement_keys).await
    }

    pub async fn check_active_member_achievement(
        &self,
        person_id: i64,
    ) -> AppResult<Vec<String>> {
        self.evaluate(person_id, active_member_achievement_keys)
            .await
    }

    async fn award_single(&self, user_id: i64, key: &str) -> AppResult<Vec<String>> {
        Ok(self
            .gamification
            .award_achievement(user_id, key)
            .await?
            .map(|a| vec![a.key])
            .unwrap_or_default())
    }

    pub async fn award_first_person(&self, user_id: i64) -> AppResult<Vec<String>> {
        self.award_single(user_id, keys::FIRST_PERSON).await
    }

    pub async fn award_email_verified(&self, user_id: i64) -> AppResult<Vec<String>> {
        self.award_single(user_id, keys::EMAIL_VERIFIED).await
    }

    pub async fn award_nearby_discovery(&self, user_id: i64) -> AppResult<Vec<String>> {
        self.award_single(user_id, keys::NEARBY_DISCOVERY).await
    }

    pub async fn check_similar_person_achievement(
        &self,
        user_id: i64,
    ) -> AppResult<Vec<String>> {
        self.award_single(user_id, keys::SIMILAR_PERSON).await
    }

    pub async fn award_group_create(&self, user_id: i64) -> AppResult<Vec<String>> {
        self.award_single(user_id, keys::GROUP_CREATE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PersonSnapshot {
        PersonSnapshot {
            has_first_name: true,
            has_pronouns: true,
            has_photo: true,
            interest_count: 5,
            contacts: vec![
                (ContactType::Email, Privacy::Public),
                (ContactType::Phone, Privacy::Private),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_two_contact_types_blocks_profile_complete_only() {
        let found = profile_achievement_keys(&snapshot());
        assert!(found.contains(&keys::INTERESTS_COMPLETE));
        assert!(found.contains(&keys::PROFILE_PHOTO));
        assert!(found.contains(&keys::FIRST_INTEREST));
        assert!(!found.contains(&keys::CONTACT_VARIETY));
        assert!(!found.contains(&keys::PROFILE_COMPLETE));
        // no last name
        assert!(!found.contains(&keys::PROFILE_BASICS));
    }

    #[test]
    fn test_third_contact_type_completes_profile() {
        let mut s = snapshot();
        s.contacts.push((ContactType::Address, Privacy::Members));
        let found = profile_achievement_keys(&s);
        assert!(found.contains(&keys::CONTACT_VARIETY));
        assert!(found.contains(&keys::PROFILE_COMPLETE));
    }

    #[test]
    fn test_repeated_contact_type_counts_once() {
        let mut s = snapshot();
        s.contacts = vec![
            (ContactType::Email, Privacy::Public),
            (ContactType::Email, Privacy::Private),
            (ContactType::Email, Privacy::Members),
        ];
        assert_eq!(s.distinct_contact_types(), 1);
        assert!(!profile_achievement_keys(&s).contains(&keys::CONTACT_VARIETY));
    }

    #[test]
    fn test_blank_fields_are_not_present() {
        let person = persons::Model {
            id: 1,
            user_id: 1,
            first_name: "Ada".into(),
            last_name: Some("  ".into()),
            pronouns: Some("she/her".into()),
            photo_url: Some(String::new()),
            bio: None,
            city: None,
            deleted_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let s = PersonSnapshot::from_person(&person);
        assert!(s.has_first_name);
        assert!(!s.has_last_name);
        assert!(s.has_pronouns);
        assert!(!s.has_photo);
    }

    #[test]
    fn test_privacy_predicates() {
        let s = PersonSnapshot {
            contacts: vec![(ContactType::Address, Privacy::Private)],
            ..Default::default()
        };
        assert_eq!(privacy_achievement_keys(&s), vec![keys::PRIVACY_GUARDIAN]);

        let s = PersonSnapshot {
            contacts: vec![
                (ContactType::Address, Privacy::Public),
                (ContactType::Email, Privacy::Private),
            ],
            ..Default::default()
        };
        assert_eq!(privacy_achievement_keys(&s), vec![keys::PRIVACY_BALANCED]);

        let s = PersonSnapshot {
            contacts: vec![(ContactType::Email, Privacy::Members)],
            ..Default::default()
        };
        assert!(privacy_achievement_keys(&s).is_empty());
    }

    #[test]
    fn test_group_predicates() {
        let mut s = PersonSnapshot::default();
        assert!(group_achievement_keys(&s).is_empty());
        s.active_group_count = 1;
        assert_eq!(group_achievement_keys(&s), vec![keys::FIRST_GROUP]);
        s.admin_group_count = 1;
        assert_eq!(
            group_achievement_keys(&s),
            vec![keys::FIRST_GROUP, keys::GROUP_ADMIN]
        );
    }

    #[test]
    fn test_active_member_needs_everything() {
        let mut s = snapshot();
        s.contacts.push((ContactType::Website, Privacy::Public));
        s.active_group_count = 1;
        assert!(active_member_achievement_keys(&s).is_empty());
        s.active_group_count = 2;
        assert_eq!(active_member_achievement_keys(&s), vec![keys::ACTIVE_MEMBER]);
        s.interest_count = 4;
        assert!(active_member_achievement_keys(&s).is_empty());
    }
}
