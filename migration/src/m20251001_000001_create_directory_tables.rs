use crate::helpers::{pk_id, timestamp_now};
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    IsAdmin,
    EmailVerifiedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Persons {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    Pronouns,
    PhotoUrl,
    Bio,
    City,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ContactInfos {
    Table,
    Id,
    PersonId,
    ContactType,
    Value,
    Privacy,
    DeletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Interests {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PersonInterests {
    Table,
    Id,
    PersonId,
    InterestId,
    DeletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Id,
    Name,
    Description,
    CreatedBy,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GroupMembers {
    Table,
    Id,
    GroupId,
    PersonId,
    Role,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, Users::Id))
                    .col(ColumnDef::new(Users::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Users::DisplayName).string_len(100).null())
                    .col(
                        ColumnDef::new(Users::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::EmailVerifiedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(&mut timestamp_now(Users::CreatedAt))
                    .col(&mut timestamp_now(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, Persons::Id))
                    .col(ColumnDef::new(Persons::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Persons::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Persons::LastName).string_len(100).null())
                    .col(ColumnDef::new(Persons::Pronouns).string_len(50).null())
                    .col(ColumnDef::new(Persons::PhotoUrl).string_len(1024).null())
                    .col(ColumnDef::new(Persons::Bio).text().null())
                    .col(ColumnDef::new(Persons::City).string_len(100).null())
                    .col(
                        ColumnDef::new(Persons::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(&mut timestamp_now(Persons::CreatedAt))
                    .col(&mut timestamp_now(Persons::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_persons_user")
                            .from(Persons::Table, Persons::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_persons_user")
                    .table(Persons::Table)
                    .col(Persons::UserId)
                    .to_owned(),
            )
            .await?;

        // contact_type / privacy are stored as short text so both backends share one schema
        manager
            .create_table(
                Table::create()
                    .table(ContactInfos::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, ContactInfos::Id))
                    .col(
                        ColumnDef::new(ContactInfos::PersonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContactInfos::ContactType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContactInfos::Value).string_len(512).not_null())
                    .col(
                        ColumnDef::new(ContactInfos::Privacy)
                            .string_len(20)
                            .not_null()
                            .default("private"),
                    )
                    .col(
                        ColumnDef::new(ContactInfos::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(&mut timestamp_now(ContactInfos::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_infos_person")
                            .from(ContactInfos::Table, ContactInfos::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_contact_infos_person")
                    .table(ContactInfos::Table)
                    .col(ContactInfos::PersonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Interests::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, Interests::Id))
                    .col(ColumnDef::new(Interests::Name).string_len(100).not_null())
                    .col(&mut timestamp_now(Interests::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_interests_name")
                    .table(Interests::Table)
                    .col(Interests::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PersonInterests::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, PersonInterests::Id))
                    .col(
                        ColumnDef::new(PersonInterests::PersonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonInterests::InterestId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonInterests::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(&mut timestamp_now(PersonInterests::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_interests_person")
                            .from(PersonInterests::Table, PersonInterests::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_interests_interest")
                            .from(PersonInterests::Table, PersonInterests::InterestId)
                            .to(Interests::Table, Interests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // a removed interest is revived instead of inserted twice
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_person_interests_person_interest")
                    .table(PersonInterests::Table)
                    .col(PersonInterests::PersonId)
                    .col(PersonInterests::InterestId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_person_interests_interest")
                    .table(PersonInterests::Table)
                    .col(PersonInterests::InterestId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, Groups::Id))
                    .col(ColumnDef::new(Groups::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Groups::Description).text().null())
                    .col(ColumnDef::new(Groups::CreatedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(Groups::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(&mut timestamp_now(Groups::CreatedAt))
                    .col(&mut timestamp_now(Groups::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_groups_created_by")
                            .from(Groups::Table, Groups::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, GroupMembers::Id))
                    .col(ColumnDef::new(GroupMembers::GroupId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GroupMembers::PersonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupMembers::Role)
                            .string_len(20)
                            .not_null()
                            .default("member"),
                    )
                    .col(&mut timestamp_now(GroupMembers::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_members_group")
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_members_person")
                            .from(GroupMembers::Table, GroupMembers::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_group_members_group_person")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::GroupId)
                    .col(GroupMembers::PersonId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_group_members_person")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::PersonId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(GroupMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PersonInterests::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Interests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(ContactInfos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Persons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
