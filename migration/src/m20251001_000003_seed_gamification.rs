use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default levels and achievement catalogue.
///
/// Keys are stable identifiers referenced from code; admins may later edit
/// name / description / sort_order / is_active but never the key or points.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        let levels_sql = r#"
INSERT INTO levels (level_number, name, description, points_required)
VALUES
 (1, 'Newcomer', 'Just arrived in the community', 0),
 (2, 'Explorer', 'Finding your way around', 50),
 (3, 'Contributor', 'Helping the directory grow', 150),
 (4, 'Connector', 'Bringing people together', 300),
 (5, 'Community Pillar', 'A cornerstone of the community', 600)
ON CONFLICT (level_number) DO NOTHING;
"#;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            levels_sql.to_string(),
        ))
        .await?;

        let achievements_sql = r#"
INSERT INTO achievements (key, name, description, points, category, sort_order, is_active)
VALUES
 ('first_person', 'Hello, World', 'Create your first person profile', 10, 'profile', 10, TRUE),
 ('email_verified', 'Verified', 'Verify your email address', 10, 'engagement', 20, TRUE),
 ('profile_basics', 'The Basics', 'Add a first name, last name and pronouns', 10, 'profile', 30, TRUE),
 ('profile_photo', 'Picture Perfect', 'Add a profile photo', 10, 'profile', 40, TRUE),
 ('first_interest', 'Curious', 'Add your first interest', 5, 'profile', 50, TRUE),
 ('interests_complete', 'Well Rounded', 'Add at least five interests', 15, 'profile', 60, TRUE),
 ('contact_variety', 'Reachable', 'Add three different kinds of contact information', 15, 'profile', 70, TRUE),
 ('profile_complete', 'All Set', 'Complete every part of your profile', 50, 'profile', 80, TRUE),
 ('privacy_guardian', 'Privacy Guardian', 'Keep an address private', 10, 'privacy', 90, TRUE),
 ('privacy_balanced', 'Open Book, Closed Drawer', 'Have both a public and a private contact', 15, 'privacy', 100, TRUE),
 ('first_group', 'Joiner', 'Join your first group', 10, 'social', 110, TRUE),
 ('group_admin', 'Organizer', 'Administer a group', 20, 'social', 120, TRUE),
 ('group_create', 'Founder', 'Create a group', 20, 'social', 130, TRUE),
 ('nearby_discovery', 'Neighbourly', 'Discover people near you', 10, 'discovery', 140, TRUE),
 ('similar_person', 'Kindred Spirits', 'Find someone who shares your interests', 10, 'discovery', 150, TRUE),
 ('active_member', 'Active Member', 'Complete profile, two groups and five interests', 50, 'engagement', 160, TRUE)
ON CONFLICT (key) DO NOTHING;
"#;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            achievements_sql.to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "DELETE FROM achievements".to_string(),
        ))
        .await?;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "DELETE FROM levels".to_string(),
        ))
        .await?;
        Ok(())
    }
}
