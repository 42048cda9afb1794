mod common;

use common::*;
use community_directory::entities::{ContactType, Privacy};
use community_directory::models::{CreateGroupRequest, PaginationParams, UpdatePersonRequest};

const FIVE: [&str; 5] = ["chess", "hiking", "jazz", "pottery", "rust"];

#[tokio::test]
async fn test_two_contact_types_blocks_profile_complete() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "ada@example.org").await;
    let svc = services(&db);

    let mut request = person_request("Ada");
    request.pronouns = Some("she/her".into());
    request.photo_url = Some("https://example.org/ada.png".into());
    let person = svc.persons.create_person(user.id, request).await.unwrap();

    add_interests(&svc, user.id, person.id, &FIVE).await;
    add_contact(&svc, user.id, person.id, ContactType::Email, Privacy::Public).await;
    add_contact(&svc, user.id, person.id, ContactType::Phone, Privacy::Private).await;

    let awarded = svc
        .triggers
        .check_profile_achievements(person.id)
        .await
        .unwrap();
    assert!(awarded.contains(&"interests_complete".to_string()));
    assert!(awarded.contains(&"profile_photo".to_string()));
    assert!(!awarded.contains(&"profile_complete".to_string()));
    assert!(!awarded.contains(&"contact_variety".to_string()));

    add_contact(&svc, user.id, person.id, ContactType::Website, Privacy::Members).await;
    let awarded = svc
        .triggers
        .check_profile_achievements(person.id)
        .await
        .unwrap();
    assert_eq!(
        awarded,
        vec!["contact_variety".to_string(), "profile_complete".to_string()]
    );
}

#[tokio::test]
async fn test_deleted_interests_are_not_counted() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "grace@example.org").await;
    let svc = services(&db);

    let person = svc
        .persons
        .create_person(user.id, person_request("Grace"))
        .await
        .unwrap();
    add_interests(&svc, user.id, person.id, &FIVE).await;

    let full = svc.persons.get_person(user.id, person.id).await.unwrap();
    let removed = full.interests[0].id;
    svc.persons
        .remove_interest(user.id, person.id, removed)
        .await
        .unwrap();

    let awarded = svc
        .triggers
        .check_profile_achievements(person.id)
        .await
        .unwrap();
    assert_eq!(awarded, vec!["first_interest".to_string()]);

    // re-adding restores the link
    add_interests(&svc, user.id, person.id, &[full.interests[0].name.as_str()]).await;
    let awarded = svc
        .triggers
        .check_profile_achievements(person.id)
        .await
        .unwrap();
    assert_eq!(awarded, vec!["interests_complete".to_string()]);
}

#[tokio::test]
async fn test_deleted_contacts_are_not_counted() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "linus@example.org").await;
    let svc = services(&db);

    let person = svc
        .persons
        .create_person(user.id, person_request("Linus"))
        .await
        .unwrap();
    let address = add_contact(&svc, user.id, person.id, ContactType::Address, Privacy::Private).await;
    svc.persons
        .delete_contact(user.id, person.id, address.id)
        .await
        .unwrap();
    add_contact(&svc, user.id, person.id, ContactType::Email, Privacy::Public).await;

    let awarded = svc
        .triggers
        .check_privacy_achievements(person.id)
        .await
        .unwrap();
    assert!(awarded.is_empty());

    add_contact(&svc, user.id, person.id, ContactType::Address, Privacy::Private).await;
    let awarded = svc
        .triggers
        .check_privacy_achievements(person.id)
        .await
        .unwrap();
    assert_eq!(
        awarded,
        vec!["privacy_guardian".to_string(), "privacy_balanced".to_string()]
    );
}

#[tokio::test]
async fn test_missing_or_deleted_person_is_a_no_op() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "gone@example.org").await;
    let svc = services(&db);

    assert!(svc.triggers.check_profile_achievements(424242).await.unwrap().is_empty());
    assert!(svc.triggers.check_group_achievements(424242).await.unwrap().is_empty());

    let mut request = person_request("Gone");
    request.photo_url = Some("https://example.org/p.png".into());
    let person = svc.persons.create_person(user.id, request).await.unwrap();
    svc.persons.delete_person(user.id, person.id).await.unwrap();

    assert!(
        svc.triggers
            .check_profile_achievements(person.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        svc.triggers
            .check_active_member_achievement(person.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_group_achievements_skip_deleted_groups() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "founder@example.org").await;
    let svc = services(&db);

    let person = svc
        .persons
        .create_person(user.id, person_request("Founder"))
        .await
        .unwrap();
    let group = svc
        .groups
        .create_group(
            user.id,
            CreateGroupRequest {
                person_id: person.id,
                name: "Book Club".into(),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(group.member_count, 1);

    svc.groups.delete_group(user.id, group.id).await.unwrap();
    assert!(
        svc.triggers
            .check_group_achievements(person.id)
            .await
            .unwrap()
            .is_empty()
    );

    let second = svc
        .groups
        .create_group(
            user.id,
            CreateGroupRequest {
                person_id: person.id,
                name: "Chess".into(),
                description: Some("Weekly games".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(second.name, "Chess");
    let awarded = svc
        .triggers
        .check_group_achievements(person.id)
        .await
        .unwrap();
    assert_eq!(
        awarded,
        vec!["first_group".to_string(), "group_admin".to_string()]
    );
}

#[tokio::test]
async fn test_active_member_requires_two_groups() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner@example.org").await;
    let member = create_test_user(&db, "member@example.org").await;
    let svc = services(&db);

    let host = svc
        .persons
        .create_person(owner.id, person_request("Host"))
        .await
        .unwrap();
    let mut g = Vec::new();
    for name in ["Runners", "Painters"] {
        let group = svc
            .groups
            .create_group(
                owner.id,
                CreateGroupRequest {
                    person_id: host.id,
                    name: name.into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        g.push(group.id);
    }

    let person = svc
        .persons
        .create_person(member.id, person_request("Mae"))
        .await
        .unwrap();
    svc.persons
        .update_person(
            member.id,
            person.id,
            UpdatePersonRequest {
                pronouns: Some("they/them".into()),
                photo_url: Some("https://example.org/mae.png".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    add_interests(&svc, member.id, person.id, &FIVE).await;
    add_contact(&svc, member.id, person.id, ContactType::Email, Privacy::Public).await;
    add_contact(&svc, member.id, person.id, ContactType::Phone, Privacy::Members).await;
    add_contact(&svc, member.id, person.id, ContactType::Social, Privacy::Public).await;

    svc.groups.join_group(member.id, g[0], person.id).await.unwrap();
    assert!(
        svc.triggers
            .check_active_member_achievement(person.id)
            .await
            .unwrap()
            .is_empty()
    );

    // joining twice is a no-op
    let joined = svc.groups.join_group(member.id, g[1], person.id).await.unwrap();
    svc.groups.join_group(member.id, g[1], person.id).await.unwrap();
    assert_eq!(joined.member_count, 2);

    assert_eq!(
        svc.triggers
            .check_active_member_achievement(person.id)
            .await
            .unwrap(),
        vec!["active_member".to_string()]
    );
    let awarded = svc
        .triggers
        .check_group_achievements(person.id)
        .await
        .unwrap();
    assert_eq!(awarded, vec!["first_group".to_string()]);
}

#[tokio::test]
async fn test_list_groups_counts_members_per_group() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "counts@example.org").await;
    let svc = services(&db);

    let host = svc
        .persons
        .create_person(owner.id, person_request("Host"))
        .await
        .unwrap();
    let mut ids = Vec::new();
    for name in ["Archers", "Bakers", "Climbers"] {
        let group = svc
            .groups
            .create_group(
                owner.id,
                CreateGroupRequest {
                    person_id: host.id,
                    name: name.into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        ids.push(group.id);
    }
    for first_name in ["Ann", "Bo"] {
        let person = svc
            .persons
            .create_person(owner.id, person_request(first_name))
            .await
            .unwrap();
        svc.groups.join_group(owner.id, ids[0], person.id).await.unwrap();
    }
    svc.groups.delete_group(owner.id, ids[1]).await.unwrap();

    let page = svc
        .groups
        .list_groups(&PaginationParams::default())
        .await
        .unwrap();
    let counts: Vec<(String, i64)> = page
        .data
        .into_iter()
        .map(|g| (g.name, g.member_count))
        .collect();
    assert_eq!(
        counts,
        vec![("Archers".to_string(), 3), ("Climbers".to_string(), 1)]
    );
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_single_award_helpers() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "helper@example.org").await;
    let svc = services(&db);

    assert_eq!(
        svc.triggers.award_first_person(user.id).await.unwrap(),
        vec!["first_person".to_string()]
    );
    assert!(svc.triggers.award_first_person(user.id).await.unwrap().is_empty());
    assert_eq!(
        svc.triggers.award_group_create(user.id).await.unwrap(),
        vec!["group_create".to_string()]
    );
    assert_eq!(
        svc.triggers
            .check_similar_person_achievement(user.id)
            .await
            .unwrap(),
        vec!["similar_person".to_string()]
    );
    assert_eq!(svc.gamification.get_user_points(user.id).await.unwrap(), 40);
}
