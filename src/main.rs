use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use community_directory::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{HttpMailer, SharedMailer},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to connect to the database");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let mailer: SharedMailer = Arc::new(HttpMailer::new(config.mailer.clone()));

    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        mailer,
        config.magic_link.clone(),
        config.admin.emails.clone(),
    );
    let gamification_service = GamificationService::new(pool.clone());
    let achievement_triggers =
        AchievementTriggers::new(pool.clone(), gamification_service.clone());
    let person_service = PersonService::new(pool.clone());
    let group_service = GroupService::new(pool.clone(), person_service.clone());
    let recommendation_service = RecommendationService::new(pool.clone(), person_service.clone());
    let admin_service = AdminService::new(pool.clone());

    tasks::spawn_all(auth_service.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(handlers::json_config())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(gamification_service.clone()))
            .app_data(web::Data::new(achievement_triggers.clone()))
            .app_data(web::Data::new(person_service.clone()))
            .app_data(web::Data::new(group_service.clone()))
            .app_data(web::Data::new(recommendation_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api")
                    .configure(handlers::auth_config)
                    .configure(handlers::person_config)
                    .configure(handlers::group_config)
                    .configure(handlers::gamification_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
