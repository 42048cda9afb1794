use crate::entities::{
    GroupRole, group_entity as groups, group_member_entity as group_members,
    person_entity as persons,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::PersonService;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct GroupService {
    pool: DatabaseConnection,
    person_service: PersonService,
}

impl GroupService {
    pub fn new(pool: DatabaseConnection, person_service: PersonService) -> Self {
        Self {
            pool,
            person_service,
        }
    }

    async fn find_active(&self, group_id: i64) -> AppResult<groups::Model> {
        groups::Entity::find_by_id(group_id)
            .filter(groups::Column::DeletedAt.is_null())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))
    }

    async fn member_count(&self, group_id: i64) -> AppResult<i64> {
        Ok(group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .count(&self.pool)
            .await? as i64)
    }

    /// Member counts for a page of groups in one grouped query.
    async fn member_counts(&self, group_ids: Vec<i64>) -> AppResult<HashMap<i64, i64>> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            group_id: i64,
            members: i64,
        }
        if group_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = group_members::Entity::find()
            .filter(group_members::Column::GroupId.is_in(group_ids))
            .select_only()
            .column(group_members::Column::GroupId)
            .column_as(Expr::col(group_members::Column::Id).count(), "members")
            .group_by(group_members::Column::GroupId)
            .into_model::<CountRow>()
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| (r.group_id, r.members)).collect())
    }

    /// Creates the group with `person_id` as its first admin.
    pub async fn create_group(
        &self,
        user_id: i64,
        request: CreateGroupRequest,
    ) -> AppResult<GroupResponse> {
        self.person_service
            .find_owned(user_id, request.person_id)
            .await?;

        let name = request.name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err(AppError::ValidationError(
                "Group name must be between 1 and 100 characters".to_string(),
            ));
        }
        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let group = groups::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description),
            created_by: Set(user_id),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        group_members::ActiveModel {
            group_id: Set(group.id),
            person_id: Set(request.person_id),
            role: Set(GroupRole::Admin),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Group {} created by person {}", group.id, request.person_id);
        Ok(GroupResponse::new(group, 1))
    }

    pub async fn list_groups(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<GroupResponse>> {
        let base_query = groups::Entity::find().filter(groups::Column::DeletedAt.is_null());
        let total = base_query.clone().count(&self.pool).await? as i64;

        let list = base_query
            .order_by_asc(groups::Column::Name)
            .order_by_asc(groups::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let counts = self
            .member_counts(list.iter().map(|g| g.id).collect())
            .await?;
        let items = list
            .into_iter()
            .map(|group| {
                let count = counts.get(&group.id).copied().unwrap_or(0);
                GroupResponse::new(group, count)
            })
            .collect();

        Ok(PaginatedResponse::from_params(items, params, total))
    }

    /// Joining twice is a no-op.
    pub async fn join_group(
        &self,
        user_id: i64,
        group_id: i64,
        person_id: i64,
    ) -> AppResult<GroupResponse> {
        self.person_service.find_owned(user_id, person_id).await?;
        let group = self.find_active(group_id).await?;

        let existing = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .filter(group_members::Column::PersonId.eq(person_id))
            .one(&self.pool)
            .await?;
        if existing.is_none() {
            group_members::ActiveModel {
                group_id: Set(group_id),
                person_id: Set(person_id),
                role: Set(GroupRole::Member),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&self.pool)
            .await?;
        }

        let count = self.member_count(group_id).await?;
        Ok(GroupResponse::new(group, count))
    }

    pub async fn leave_group(&self, user_id: i64, group_id: i64, person_id: i64) -> AppResult<()> {
        self.person_service.find_owned(user_id, person_id).await?;
        self.find_active(group_id).await?;

        let res = group_members::Entity::delete_many()
            .filter(group_members::Column::GroupId.eq(group_id))
            .filter(group_members::Column::PersonId.eq(person_id))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Not a member of this group".to_string()));
        }
        Ok(())
    }

    /// Soft delete; only a user with an admin person in the group may do it.
    pub async fn delete_group(&self, user_id: i64, group_id: i64) -> AppResult<()> {
        let group = self.find_active(group_id).await?;

        let admin_person_ids: Vec<i64> = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .filter(group_members::Column::Role.eq(GroupRole::Admin))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|m| m.person_id)
            .collect();

        let is_admin = !admin_person_ids.is_empty()
            && persons::Entity::find()
                .filter(persons::Column::Id.is_in(admin_person_ids))
                .filter(persons::Column::UserId.eq(user_id))
                .filter(persons::Column::DeletedAt.is_null())
                .count(&self.pool)
                .await?
                > 0;
        if !is_admin {
            return Err(AppError::Forbidden);
        }

        let now = Utc::now();
        let mut active: groups::ActiveModel = group.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.pool).await?;
        log::info!("Group {group_id} deleted by user {user_id}");
        Ok(())
    }
}
