mod common;

use chrono::{Duration, Utc};
use common::*;
use community_directory::AppError;
use community_directory::models::{MagicLinkRequest, RefreshTokenRequest, VerifyMagicLinkRequest};
use community_directory::services::MagicLinkRateLimiter;

fn link_request(email: &str) -> MagicLinkRequest {
    MagicLinkRequest {
        email: email.to_string(),
    }
}

#[tokio::test]
async fn test_fourth_request_in_window_is_rate_limited() {
    let db = setup_test_db().await;
    let (auth, mailer) = auth_service(&db, vec![]);

    for _ in 0..3 {
        let response = auth
            .request_magic_link(link_request("ada@example.org"))
            .await
            .unwrap();
        assert_eq!(response.expires_in, 900);
    }

    // normalized to the same key
    let result = auth
        .request_magic_link(link_request("  ADA@Example.org "))
        .await;
    assert!(matches!(result, Err(AppError::RateLimited(_))));
    assert_eq!(mailer.sent(), 3);

    // other addresses are unaffected
    auth.request_magic_link(link_request("grace@example.org"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_window_slides() {
    let db = setup_test_db().await;
    let limiter = MagicLinkRateLimiter::new(db.clone(), 3, 900);
    let start = Utc::now() - Duration::seconds(1000);

    for i in 0..3 {
        limiter
            .check_and_record_at("slide@example.org", start + Duration::seconds(i))
            .await
            .unwrap();
    }
    // all earlier attempts fell out of the window
    limiter
        .check_and_record_at("slide@example.org", Utc::now())
        .await
        .unwrap();

    assert_eq!(limiter.purge(Utc::now()).await.unwrap(), 3);
}

#[tokio::test]
async fn test_invalid_email_rejected() {
    let db = setup_test_db().await;
    let (auth, mailer) = auth_service(&db, vec![]);

    let result = auth.request_magic_link(link_request("not-an-email")).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));
    assert_eq!(mailer.sent(), 0);
}

#[tokio::test]
async fn test_magic_link_is_single_use() {
    let db = setup_test_db().await;
    let (auth, mailer) = auth_service(&db, vec![]);

    auth.request_magic_link(link_request("Lin@Example.org"))
        .await
        .unwrap();
    let token = mailer.last_token();

    let login = auth
        .verify_magic_link(VerifyMagicLinkRequest {
            token: token.clone(),
        })
        .await
        .unwrap();
    assert!(login.response.is_new_user);
    assert_eq!(login.response.user.email, "lin@example.org");
    assert!(login.response.user.email_verified_at.is_some());
    assert!(!login.response.user.is_admin);

    let again = auth
        .verify_magic_link(VerifyMagicLinkRequest { token })
        .await;
    assert!(matches!(again, Err(AppError::AuthError(_))));

    // second link for the same address signs into the same account
    auth.request_magic_link(link_request("lin@example.org"))
        .await
        .unwrap();
    let login2 = auth
        .verify_magic_link(VerifyMagicLinkRequest {
            token: mailer.last_token(),
        })
        .await
        .unwrap();
    assert!(!login2.response.is_new_user);
    assert_eq!(login2.user_id, login.user_id);
}

#[tokio::test]
async fn test_unknown_token_rejected() {
    let db = setup_test_db().await;
    let (auth, _) = auth_service(&db, vec![]);

    let result = auth
        .verify_magic_link(VerifyMagicLinkRequest {
            token: "deadbeef".into(),
        })
        .await;
    assert!(matches!(result, Err(AppError::AuthError(_))));
}

#[tokio::test]
async fn test_admin_email_promoted_on_sign_in() {
    let db = setup_test_db().await;
    let (auth, mailer) = auth_service(&db, vec!["Boss@Example.org".into()]);

    auth.request_magic_link(link_request("boss@example.org"))
        .await
        .unwrap();
    let login = auth
        .verify_magic_link(VerifyMagicLinkRequest {
            token: mailer.last_token(),
        })
        .await
        .unwrap();
    assert!(login.response.user.is_admin);

    let svc = services(&db);
    svc.admin.ensure_admin(login.user_id).await.unwrap();
}

#[tokio::test]
async fn test_refresh_and_me() {
    let db = setup_test_db().await;
    let (auth, mailer) = auth_service(&db, vec![]);

    auth.request_magic_link(link_request("refresh@example.org"))
        .await
        .unwrap();
    let login = auth
        .verify_magic_link(VerifyMagicLinkRequest {
            token: mailer.last_token(),
        })
        .await
        .unwrap();

    let refreshed = auth
        .refresh_token(RefreshTokenRequest {
            refresh_token: login.response.refresh_token.clone(),
        })
        .await
        .unwrap();
    assert!(!refreshed.access_token.is_empty());

    // an access token is not a refresh token
    let wrong = auth
        .refresh_token(RefreshTokenRequest {
            refresh_token: login.response.access_token.clone(),
        })
        .await;
    assert!(wrong.is_err());

    let me = auth.me(login.user_id).await.unwrap();
    assert_eq!(me.email, "refresh@example.org");
}

#[tokio::test]
async fn test_purge_removes_used_tokens() {
    let db = setup_test_db().await;
    let (auth, mailer) = auth_service(&db, vec![]);

    auth.request_magic_link(link_request("purge@example.org"))
        .await
        .unwrap();
    auth.verify_magic_link(VerifyMagicLinkRequest {
        token: mailer.last_token(),
    })
    .await
    .unwrap();

    // one used token; the attempt is still inside its window
    assert_eq!(auth.purge_expired().await.unwrap(), 1);
    assert_eq!(auth.purge_expired().await.unwrap(), 0);
}
