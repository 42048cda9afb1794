mod common;

use common::*;
use community_directory::AppError;
use community_directory::entities::{
    point_transaction_entity as point_transactions, user_achievement_entity as user_achievements,
};
use community_directory::models::{PaginationParams, UpdateAchievementRequest};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn test_points_never_negative() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "neg@example.org").await;
    let svc = services(&db);

    svc.gamification
        .adjust_points(user.id, 20, "welcome bonus")
        .await
        .unwrap();
    svc.gamification
        .adjust_points(user.id, -30, "correction")
        .await
        .unwrap();

    assert_eq!(svc.gamification.get_user_points(user.id).await.unwrap(), 0);

    let stats = svc.gamification.get_user_stats(user.id).await.unwrap();
    assert_eq!(stats.total_points, 0);
    assert_eq!(stats.current_level.unwrap().name, "Newcomer");
}

#[tokio::test]
async fn test_award_twice_writes_once() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "twice@example.org").await;
    let svc = services(&db);

    let first = svc
        .gamification
        .award_achievement(user.id, "first_person")
        .await
        .unwrap();
    assert_eq!(first.map(|a| a.points), Some(10));

    let second = svc
        .gamification
        .award_achievement(user.id, "first_person")
        .await
        .unwrap();
    assert!(second.is_none());

    let completions = user_achievements::Entity::find()
        .filter(user_achievements::Column::UserId.eq(user.id))
        .count(&db)
        .await
        .unwrap();
    let ledger = point_transactions::Entity::find()
        .filter(point_transactions::Column::UserId.eq(user.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(completions, 1);
    assert_eq!(ledger, 1);
    assert_eq!(svc.gamification.get_user_points(user.id).await.unwrap(), 10);
    assert!(
        svc.gamification
            .has_achievement(user.id, "first_person")
            .await
            .unwrap()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_awards_write_once() {
    let (db, path) = setup_file_db(8).await;
    let user = create_test_user(&db, "race@example.org").await;
    let svc = services(&db);
    let user_id = user.id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gamification = svc.gamification.clone();
            tokio::spawn(async move {
                gamification
                    .award_achievement(user_id, "profile_photo")
                    .await
            })
        })
        .collect();

    let mut awarded = 0;
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok(), "award failed: {:?}", result.err());
        if result.unwrap().is_some() {
            awarded += 1;
        }
    }

    let completions = user_achievements::Entity::find()
        .filter(user_achievements::Column::UserId.eq(user.id))
        .count(&db)
        .await
        .unwrap();
    let ledger = point_transactions::Entity::find()
        .filter(point_transactions::Column::UserId.eq(user.id))
        .count(&db)
        .await
        .unwrap();

    drop(svc);
    drop(db);
    remove_db_file(&path);

    assert_eq!(awarded, 1);
    assert_eq!(completions, 1);
    assert_eq!(ledger, 1);
}

#[tokio::test]
async fn test_check_and_award_multiple_returns_only_new_keys() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "multi@example.org").await;
    let svc = services(&db);

    svc.gamification
        .award_achievement(user.id, "first_person")
        .await
        .unwrap();

    let keys = vec![
        "first_person".to_string(),
        "profile_photo".to_string(),
        "no_such_key".to_string(),
    ];
    let awarded = svc
        .gamification
        .check_and_award_multiple(user.id, &keys)
        .await
        .unwrap();
    assert_eq!(awarded, vec!["profile_photo".to_string()]);

    let again = svc
        .gamification
        .check_and_award_multiple(user.id, &keys)
        .await
        .unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_new_user_stats() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "fresh@example.org").await;
    let svc = services(&db);

    let stats = svc.gamification.get_user_stats(user.id).await.unwrap();
    assert_eq!(stats.total_points, 0);
    assert_eq!(stats.current_level.unwrap().name, "Newcomer");
    assert_eq!(stats.next_level.unwrap().name, "Explorer");
    assert_eq!(stats.progress_percent, 0);
    assert_eq!(stats.points_to_next_level, Some(50));
    assert_eq!(stats.achievements_earned, 0);
    assert_eq!(stats.achievements_total, 16);
}

#[tokio::test]
async fn test_exact_threshold_reaches_level() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "fifty@example.org").await;
    let svc = services(&db);

    svc.gamification
        .adjust_points(user.id, 50, "seed")
        .await
        .unwrap();

    let level = svc.gamification.get_user_level(user.id).await.unwrap();
    assert_eq!(level.unwrap().name, "Explorer");
    let next = svc.gamification.get_next_level(user.id).await.unwrap();
    assert_eq!(next.unwrap().name, "Contributor");

    let stats = svc.gamification.get_user_stats(user.id).await.unwrap();
    assert_eq!(stats.progress_percent, 0);

    svc.gamification
        .adjust_points(user.id, 50, "more")
        .await
        .unwrap();
    let stats = svc.gamification.get_user_stats(user.id).await.unwrap();
    assert_eq!(stats.progress_percent, 50);
}

#[tokio::test]
async fn test_max_level_has_full_progress() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "max@example.org").await;
    let svc = services(&db);

    svc.gamification
        .adjust_points(user.id, 1000, "seed")
        .await
        .unwrap();
    let stats = svc.gamification.get_user_stats(user.id).await.unwrap();
    assert_eq!(stats.current_level.unwrap().name, "Community Pillar");
    assert!(stats.next_level.is_none());
    assert_eq!(stats.progress_percent, 100);
    assert!(stats.points_to_next_level.is_none());
}

#[tokio::test]
async fn test_inactive_achievement_is_not_awarded() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "inactive@example.org").await;
    let svc = services(&db);

    svc.admin
        .update_achievement(
            "profile_photo",
            UpdateAchievementRequest {
                name: None,
                description: None,
                sort_order: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();

    let result = svc
        .gamification
        .award_achievement(user.id, "profile_photo")
        .await
        .unwrap();
    assert!(result.is_none());

    let stats = svc.gamification.get_user_stats(user.id).await.unwrap();
    assert_eq!(stats.achievements_total, 15);
}

#[tokio::test]
async fn test_achievement_list_marks_completion() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "list@example.org").await;
    let svc = services(&db);

    svc.gamification
        .award_achievement(user.id, "email_verified")
        .await
        .unwrap();

    let list = svc
        .gamification
        .list_achievements_for_user(user.id)
        .await
        .unwrap();
    assert_eq!(list.len(), 16);
    assert_eq!(list[0].key, "first_person");

    let verified = list.iter().find(|a| a.key == "email_verified").unwrap();
    assert!(verified.completed);
    assert!(verified.completed_at.is_some());
    assert_eq!(list.iter().filter(|a| a.completed).count(), 1);
}

#[tokio::test]
async fn test_transactions_newest_first() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "ledger@example.org").await;
    let svc = services(&db);

    svc.gamification
        .award_achievement(user.id, "first_person")
        .await
        .unwrap();
    svc.gamification
        .adjust_points(user.id, 5, "manual")
        .await
        .unwrap();

    let page = svc
        .gamification
        .list_point_transactions(user.id, &PaginationParams::new(Some(1), Some(1)))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].reason, "manual");
}

#[tokio::test]
async fn test_adjust_points_validation() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "adjust@example.org").await;
    let svc = services(&db);

    assert!(matches!(
        svc.gamification.adjust_points(user.id, 0, "nothing").await,
        Err(AppError::ValidationError(_))
    ));
    assert!(matches!(
        svc.gamification.adjust_points(user.id, 5, "   ").await,
        Err(AppError::ValidationError(_))
    ));
    assert!(matches!(
        svc.gamification.adjust_points(9999, 5, "ghost").await,
        Err(AppError::NotFound(_))
    ));
}
