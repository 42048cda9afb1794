#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use community_directory::AppResult;
use community_directory::config::MagicLinkConfig;
use community_directory::entities::{ContactType, Privacy, user_entity as users};
use community_directory::external::{MailSender, SharedMailer};
use community_directory::models::*;
use community_directory::services::*;
use community_directory::utils::JwtService;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Fresh migrated in-memory database. One connection so every query sees the same memory db.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Migrated SQLite file with a multi-connection pool, for tests that need real concurrency.
/// Returns the pool and the file path so the caller can remove it.
pub async fn setup_file_db(max_connections: u32) -> (DatabaseConnection, PathBuf) {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let path = std::env::temp_dir().join(format!(
        "community-directory-{}-{}.db",
        std::process::id(),
        nanos
    ));
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options
        .max_connections(max_connections)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open file database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    (db, path)
}

pub fn remove_db_file(path: &Path) {
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> users::Model {
    let now = Utc::now();
    users::ActiveModel {
        email: Set(email.to_string()),
        display_name: Set(None),
        is_admin: Set(false),
        email_verified_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create user")
}

pub struct Services {
    pub gamification: GamificationService,
    pub triggers: AchievementTriggers,
    pub persons: PersonService,
    pub groups: GroupService,
    pub recommendations: RecommendationService,
    pub admin: AdminService,
}

pub fn services(db: &DatabaseConnection) -> Services {
    let gamification = GamificationService::new(db.clone());
    let persons = PersonService::new(db.clone());
    Services {
        triggers: AchievementTriggers::new(db.clone(), gamification.clone()),
        gamification,
        groups: GroupService::new(db.clone(), persons.clone()),
        recommendations: RecommendationService::new(db.clone(), persons.clone()),
        admin: AdminService::new(db.clone()),
        persons,
    }
}

pub fn person_request(first_name: &str) -> CreatePersonRequest {
    CreatePersonRequest {
        first_name: first_name.to_string(),
        last_name: None,
        pronouns: None,
        photo_url: None,
        bio: None,
        city: None,
    }
}

pub async fn add_interests(svc: &Services, user_id: i64, person_id: i64, names: &[&str]) {
    for name in names {
        svc.persons
            .add_interest(
                user_id,
                person_id,
                AddInterestRequest {
                    name: name.to_string(),
                },
            )
            .await
            .expect("Failed to add interest");
    }
}

pub async fn add_contact(
    svc: &Services,
    user_id: i64,
    person_id: i64,
    contact_type: ContactType,
    privacy: Privacy,
) -> ContactInfoResponse {
    svc.persons
        .add_contact(
            user_id,
            person_id,
            CreateContactRequest {
                contact_type,
                value: format!("{contact_type:?}-value"),
                privacy: Some(privacy),
            },
        )
        .await
        .expect("Failed to add contact")
}

/// Keeps every link it was asked to send.
#[derive(Default)]
pub struct CapturingMailer {
    pub links: Mutex<Vec<(String, String)>>,
}

impl CapturingMailer {
    pub fn last_token(&self) -> String {
        let links = self.links.lock().unwrap();
        let (_, link) = links.last().expect("No link was sent");
        link.split("token=").nth(1).expect("Link has no token").to_string()
    }

    pub fn sent(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

#[async_trait]
impl MailSender for CapturingMailer {
    async fn send_magic_link(&self, to: &str, link: &str) -> AppResult<()> {
        self.links
            .lock()
            .unwrap()
            .push((to.to_string(), link.to_string()));
        Ok(())
    }
}

pub const TEST_SECRET: &str = "test-secret";

pub fn jwt_service() -> JwtService {
    JwtService::new(TEST_SECRET, 3600, 7200)
}

pub fn auth_service(
    db: &DatabaseConnection,
    admin_emails: Vec<String>,
) -> (AuthService, Arc<CapturingMailer>) {
    let mailer = Arc::new(CapturingMailer::default());
    let shared: SharedMailer = mailer.clone();
    let service = AuthService::new(
        db.clone(),
        jwt_service(),
        shared,
        MagicLinkConfig::default(),
        admin_emails,
    );
    (service, mailer)
}
