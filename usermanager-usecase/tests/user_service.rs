//! Tests for the user service: creation, cache-aside reads, invalidation on
//! writes and credential checks.
mod common;

use std::sync::atomic::Ordering;

use common::{harness, harness_with_storage, new_user, CountingStorage};
use usermanager_shared::PaginationQuery;
use usermanager_shared::types::Role;
use usermanager_usecase::{ErrorKind, UsecaseError, VoteOutcome};
use uuid::Uuid;

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_assigns_identity_role_and_hash() {
    let h = harness();
    let mut requested = new_user("alice");
    requested.role = Role::Admin;
    requested.user_id = Uuid::nil();

    let user = h.service.create_user(requested).await.unwrap();

    assert!(!user.user_id.is_nil());
    assert_eq!(user.role, Role::User);
    assert_eq!(user.created_at, h.clock_now());
    assert_ne!(user.password, "secret-password");
    assert!(user.verify_password("secret-password").is_ok());
}

#[tokio::test]
async fn test_create_rejects_taken_nickname() {
    let h = harness();
    h.service.create_user(new_user("alice")).await.unwrap();

    let err = h.service.create_user(new_user("alice")).await.unwrap_err();
    assert!(matches!(err, UsecaseError::DuplicateNickname(ref n) if n == "alice"));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

// ============================================================================
// Cache-aside reads
// ============================================================================

#[tokio::test]
async fn test_get_user_cold_then_warm() {
    let h = harness();
    let user = h.service.create_user(new_user("alice")).await.unwrap();
    let reads_before = h.users.find_by_id.load(Ordering::SeqCst);
    let sets_before = h.storage.sets();

    let cold = h.service.get_user(&user.user_id).await.unwrap().unwrap();
    assert_eq!(h.users.find_by_id.load(Ordering::SeqCst), reads_before + 1);
    assert_eq!(h.storage.sets(), sets_before + 1);

    let warm = h.service.get_user(&user.user_id).await.unwrap().unwrap();
    assert_eq!(h.users.find_by_id.load(Ordering::SeqCst), reads_before + 1);
    assert_eq!(warm, cold);
}

#[tokio::test]
async fn test_missing_user_is_none_and_not_cached() {
    let h = harness();
    let id = Uuid::new_v4();

    assert!(h.service.get_user(&id).await.unwrap().is_none());
    assert!(h.service.get_user(&id).await.unwrap().is_none());
    assert_eq!(h.storage.sets(), 0);
    assert_eq!(h.users.find_by_id.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cache_read_failure_is_returned() {
    let h = harness_with_storage(CountingStorage::failing_reads());
    let user = h.service.create_user(new_user("alice")).await.unwrap();

    let err = h.service.get_user(&user.user_id).await.unwrap_err();
    assert!(matches!(err, UsecaseError::Cache { stage: "get_user.cache_get", .. }));
    assert_eq!(err.kind(), ErrorKind::Infrastructure);
}

#[tokio::test]
async fn test_cache_write_failure_is_swallowed() {
    let h = harness_with_storage(CountingStorage::failing_writes());
    let user = h.service.create_user(new_user("alice")).await.unwrap();

    let found = h.service.get_user(&user.user_id).await.unwrap();
    assert_eq!(found.map(|u| u.nickname), Some("alice".to_string()));
}

#[tokio::test]
async fn test_get_user_by_nickname() {
    let h = harness();
    let user = h.service.create_user(new_user("alice")).await.unwrap();

    let found = h.service.get_user_by_nickname("alice").await.unwrap().unwrap();
    assert_eq!(found.user_id, user.user_id);
    assert!(h.service.get_user_by_nickname("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_user_by_id_attaches_authored_votes() {
    let h = harness();
    let alice = h.service.create_user(new_user("alice")).await.unwrap();
    let bob = h.service.create_user(new_user("bob")).await.unwrap();

    h.service.vote_for_user(alice.user_id, bob.user_id, -1).await.unwrap();

    let alice = h.service.get_user_by_id(&alice.user_id).await.unwrap().unwrap();
    assert_eq!(alice.votes.len(), 1);
    assert_eq!(alice.rating(), -1);

    let bob = h.service.get_user_by_id(&bob.user_id).await.unwrap().unwrap();
    assert!(bob.votes.is_empty());
}

#[tokio::test]
async fn test_pages_carry_votes_and_has_more() {
    let h = harness();
    let mut ids = Vec::new();
    for nickname in ["a", "b", "c"] {
        let user = h.service.create_user(new_user(nickname)).await.unwrap();
        ids.push(user.user_id);
        h.clock.advance(1);
    }
    h.service.vote_for_user(ids[0], ids[2], 1).await.unwrap();

    let query = PaginationQuery::from_params("1", "2", "").unwrap();
    let page = h.service.get_users_by_pagination_query(&query).await.unwrap();
    assert!(page.has_more);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].user_id, ids[0]);
    assert_eq!(page.items[0].rating(), 1);
    assert_eq!(page.items[1].rating(), 0);

    let query = PaginationQuery::from_params("2", "2", "").unwrap();
    let page = h.service.get_users(&query).await.unwrap();
    assert!(!page.has_more);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.page, 2);
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_update_invalidates_cached_user() {
    let h = harness();
    let user = h.service.create_user(new_user("alice")).await.unwrap();
    h.service.get_user(&user.user_id).await.unwrap();
    h.service.get_user_by_nickname("alice").await.unwrap();

    let mut changed = user.clone();
    changed.first_name = "Alicia".to_string();
    changed.nickname = "alicia".to_string();
    h.clock.advance(5);
    let updated = h.service.update_user(changed).await.unwrap();
    assert_eq!(updated.updated_at, Some(h.clock_now()));

    let fresh = h.service.get_user(&user.user_id).await.unwrap().unwrap();
    assert_eq!(fresh.first_name, "Alicia");
    assert!(h.service.get_user_by_nickname("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_to_taken_nickname_conflicts() {
    let h = harness();
    h.service.create_user(new_user("alice")).await.unwrap();
    let bob = h.service.create_user(new_user("bob")).await.unwrap();

    let mut changed = bob.clone();
    changed.nickname = "alice".to_string();
    let err = h.service.check_user_by_nickname(&changed).await.unwrap_err();
    assert!(matches!(err, UsecaseError::DuplicateNickname(_)));

    let err = h.service.update_user(changed).await.unwrap_err();
    assert!(matches!(err, UsecaseError::DuplicateNickname(_)));

    assert!(h.service.check_user_by_nickname(&bob).await.is_ok());
}

#[tokio::test]
async fn test_update_missing_user_is_not_found() {
    let h = harness();
    let mut ghost = new_user("ghost");
    ghost.user_id = Uuid::new_v4();

    let err = h.service.update_user(ghost).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_twice_is_not_found() {
    let h = harness();
    let user = h.service.create_user(new_user("alice")).await.unwrap();
    h.service.get_user(&user.user_id).await.unwrap();

    h.service.delete_user(&user.user_id).await.unwrap();
    assert!(h.service.get_user(&user.user_id).await.unwrap().is_none());

    let err = h.service.delete_user(&user.user_id).await.unwrap_err();
    assert!(matches!(err, UsecaseError::Store { stage: "delete_user.delete_user", .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_soft_delete_hides_user() {
    let h = harness();
    let user = h.service.create_user(new_user("alice")).await.unwrap();
    h.service.get_user(&user.user_id).await.unwrap();

    h.clock.advance(45);
    let deleted = h.service.soft_delete_user(&user.user_id).await.unwrap();
    assert_eq!(deleted.deleted_at, Some(h.clock_now()));
    assert!(h.service.get_user(&user.user_id).await.unwrap().is_none());
    assert!(h.service.get_user_by_nickname("alice").await.unwrap().is_none());
}

// ============================================================================
// Credentials and voting
// ============================================================================

#[tokio::test]
async fn test_authenticate_stamps_login_date() {
    let h = harness();
    h.service.create_user(new_user("alice")).await.unwrap();
    h.clock.advance(30);

    let user = h.service.authenticate("alice", "secret-password").await.unwrap();
    assert_eq!(user.login_date, Some(h.clock_now()));

    let err = h.service.authenticate("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, UsecaseError::InvalidCredentials));
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = h.service.authenticate("nobody", "secret-password").await.unwrap_err();
    assert!(matches!(err, UsecaseError::InvalidCredentials));
}

#[tokio::test]
async fn test_vote_for_unknown_target() {
    let h = harness();
    let voter = h.service.create_user(new_user("alice")).await.unwrap();
    let target = Uuid::new_v4();

    let err = h
        .service
        .vote_for_user(voter.user_id, target, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, UsecaseError::UserNotFound(id) if id == target));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.votes.calls(), 0);
}

#[tokio::test]
async fn test_vote_for_user_applies_rate_limit() {
    let h = harness();
    let alice = h.service.create_user(new_user("alice")).await.unwrap();
    let bob = h.service.create_user(new_user("bob")).await.unwrap();
    let carol = h.service.create_user(new_user("carol")).await.unwrap();

    let outcome = h.service.vote_for_user(alice.user_id, bob.user_id, 1).await.unwrap();
    assert!(matches!(outcome, VoteOutcome::Created { .. }));

    let err = h
        .service
        .vote_for_user(alice.user_id, carol.user_id, 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimited);
}
