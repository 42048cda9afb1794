use crate::config::MagicLinkConfig;
use crate::entities::{magic_link_token_entity as tokens, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::external::SharedMailer;
use crate::models::*;
use crate::services::MagicLinkRateLimiter;
use crate::utils::*;
use chrono::{Duration, Utc};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    mailer: SharedMailer,
    rate_limiter: MagicLinkRateLimiter,
    magic_link: MagicLinkConfig,
    admin_emails: Vec<String>,
}

/// Result of a successful link verification.
pub struct VerifiedLogin {
    pub response: AuthResponse,
    pub user_id: i64,
}

impl AuthService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        mailer: SharedMailer,
        magic_link: MagicLinkConfig,
        admin_emails: Vec<String>,
    ) -> Self {
        let rate_limiter = MagicLinkRateLimiter::new(
            pool.clone(),
            magic_link.max_requests,
            magic_link.window_seconds,
        );
        Self {
            pool,
            jwt_service,
            mailer,
            rate_limiter,
            magic_link,
            admin_emails: admin_emails.iter().map(|e| normalize_email(e)).collect(),
        }
    }

    fn build_link(&self, token: &str) -> String {
        let sep = if self.magic_link.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", self.magic_link.base_url, sep, token)
    }

    pub async fn request_magic_link(&self, request: MagicLinkRequest) -> AppResult<MagicLinkResponse> {
        let email = validate_email(&request.email)?;

        self.rate_limiter.check_and_record(&email).await?;

        let token = generate_login_token();
        let now = Utc::now();
        tokens::ActiveModel {
            email: Set(email.clone()),
            token_hash: Set(hash_token(&token)),
            expires_at: Set(now + Duration::seconds(self.magic_link.token_ttl_seconds)),
            used_at: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        self.mailer
            .send_magic_link(&email, &self.build_link(&token))
            .await?;

        Ok(MagicLinkResponse {
            expires_in: self.magic_link.token_ttl_seconds,
        })
    }

    /// Consumes the token and signs the user in, creating the account on first use.
    pub async fn verify_magic_link(&self, request: VerifyMagicLinkRequest) -> AppResult<VerifiedLogin> {
        let token_hash = hash_token(request.token.trim());
        let now = Utc::now();

        // conditional update: only one caller can flip used_at
        let consumed = tokens::Entity::update_many()
            .col_expr(tokens::Column::UsedAt, Expr::value(Some(now)))
            .filter(tokens::Column::TokenHash.eq(token_hash.as_str()))
            .filter(tokens::Column::UsedAt.is_null())
            .filter(tokens::Column::ExpiresAt.gt(now))
            .exec(&self.pool)
            .await?;
        if consumed.rows_affected == 0 {
            return Err(AppError::AuthError(
                "Sign-in link is invalid or expired".to_string(),
            ));
        }

        let record = tokens::Entity::find()
            .filter(tokens::Column::TokenHash.eq(token_hash.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError("Consumed token vanished".to_string()))?;

        let should_be_admin = self.admin_emails.contains(&record.email);

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(record.email.as_str()))
            .one(&self.pool)
            .await?;

        let (user, is_new_user) = match existing {
            Some(user) => {
                let needs_verify = user.email_verified_at.is_none();
                let needs_promote = should_be_admin && !user.is_admin;
                if needs_verify || needs_promote {
                    let mut active: users::ActiveModel = user.into();
                    if needs_verify {
                        active.email_verified_at = Set(Some(now));
                    }
                    if needs_promote {
                        active.is_admin = Set(true);
                    }
                    active.updated_at = Set(now);
                    (active.update(&self.pool).await?, false)
                } else {
                    (user, false)
                }
            }
            None => {
                let user = users::ActiveModel {
                    email: Set(record.email.clone()),
                    display_name: Set(None),
                    is_admin: Set(should_be_admin),
                    email_verified_at: Set(Some(now)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await?;
                log::info!("Created user {} for {}", user.id, user.email);
                (user, true)
            }
        };

        let access_token = self.jwt_service.generate_access_token(user.id, &user.email)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id, &user.email)?;
        let user_id = user.id;

        Ok(VerifiedLogin {
            response: AuthResponse {
                access_token,
                refresh_token,
                expires_in: self.jwt_service.get_access_token_expires_in(),
                user: UserResponse::from(user),
                is_new_user,
            },
            user_id,
        })
    }

    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> AppResult<RefreshTokenResponse> {
        let claims = self.jwt_service.verify_refresh_token(&request.refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        Ok(RefreshTokenResponse {
            access_token: self.jwt_service.generate_access_token(user.id, &user.email)?,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn me(&self, user_id: i64) -> AppResult<UserResponse> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Deletes spent or expired tokens and stale rate-limit attempts.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let now = Utc::now();
        let tokens_removed = tokens::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(tokens::Column::ExpiresAt.lte(now))
                    .add(tokens::Column::UsedAt.is_not_null()),
            )
            .exec(&self.pool)
            .await?
            .rows_affected;
        let attempts_removed = self.rate_limiter.purge(now).await?;
        Ok(tokens_removed + attempts_removed)
    }
}
