//! Integration tests for failed-login lockout.

mod helpers;

use std::sync::Arc;

use chrono::Duration;

use filehub_auth::{LockoutPolicy, LockoutTracker};
use filehub_core::error::ErrorKind;
use filehub_core::traits::Clock;
use filehub_database::IdentityStore;

fn tracker(ctx: &helpers::TestContext) -> LockoutTracker {
    let policy = LockoutPolicy::new(
        helpers::THRESHOLD,
        Duration::seconds(helpers::TTL_MIN),
        Duration::seconds(helpers::TTL_MAX),
    )
    .unwrap();
    LockoutTracker::new(ctx.store.clone(), ctx.clock.clone(), policy)
}

async fn fail(tracker: &LockoutTracker, username: &str, times: u32) {
    for _ in 0..times {
        tracker.count_attempt(username).await.unwrap();
    }
}

#[tokio::test]
async fn test_below_threshold_never_locks() {
    let ctx = helpers::TestContext::new().await;
    let tracker = tracker(&ctx);

    assert!(!tracker.handle_locking("alice").await.unwrap());
    for _ in 1..helpers::THRESHOLD {
        tracker.count_attempt("alice").await.unwrap();
        assert!(!tracker.handle_locking("alice").await.unwrap());
    }
}

#[tokio::test]
async fn test_active_lock_slides_last_attempt() {
    let ctx = helpers::TestContext::new().await;
    let tracker = tracker(&ctx);
    fail(&tracker, "alice", helpers::THRESHOLD).await;

    ctx.advance(helpers::TTL_MIN - 1);
    assert!(tracker.handle_locking("alice").await.unwrap());

    let row = ctx.store.get_login_attempts("alice").await.unwrap().unwrap();
    assert_eq!(row.last_attempt, ctx.clock.now());
    assert_eq!(row.count(), helpers::THRESHOLD);

    // Retrying while locked keeps the lock alive.
    ctx.advance(helpers::TTL_MIN - 1);
    assert!(tracker.handle_locking("alice").await.unwrap());
}

#[tokio::test]
async fn test_expired_lock_leaves_row_untouched() {
    let ctx = helpers::TestContext::new().await;
    let tracker = tracker(&ctx);
    fail(&tracker, "alice", helpers::THRESHOLD).await;
    let before = ctx.store.get_login_attempts("alice").await.unwrap().unwrap();

    ctx.advance(helpers::TTL_MIN);
    assert!(!tracker.handle_locking("alice").await.unwrap());

    let after = ctx.store.get_login_attempts("alice").await.unwrap().unwrap();
    assert_eq!(after.count(), before.count());
    assert_eq!(after.last_attempt, before.last_attempt);
}

#[tokio::test]
async fn test_window_doubles_per_attempt_and_caps() {
    let ctx = helpers::TestContext::new().await;
    let tracker = tracker(&ctx);
    fail(&tracker, "alice", helpers::THRESHOLD + 2).await;

    // threshold + 2 attempts: 10s * 4 = 40s
    ctx.advance(39);
    assert!(tracker.handle_locking("alice").await.unwrap());
    ctx.advance(40);
    assert!(!tracker.handle_locking("alice").await.unwrap());

    fail(&tracker, "alice", 20).await;
    ctx.advance(helpers::TTL_MAX - 1);
    assert!(tracker.handle_locking("alice").await.unwrap());
    ctx.advance(helpers::TTL_MAX);
    assert!(!tracker.handle_locking("alice").await.unwrap());
}

#[tokio::test]
async fn test_expiry_does_not_forgive_attempts() {
    let ctx = helpers::TestContext::new().await;
    let tracker = tracker(&ctx);
    fail(&tracker, "alice", helpers::THRESHOLD).await;

    ctx.advance(helpers::TTL_MIN);
    assert!(!tracker.handle_locking("alice").await.unwrap());

    // One more failure after expiry locks again, with a doubled window.
    tracker.count_attempt("alice").await.unwrap();
    ctx.advance(2 * helpers::TTL_MIN - 1);
    assert!(tracker.handle_locking("alice").await.unwrap());
}

#[tokio::test]
async fn test_reset_clears_row() {
    let ctx = helpers::TestContext::new().await;
    let tracker = tracker(&ctx);
    fail(&tracker, "alice", helpers::THRESHOLD).await;

    tracker.reset_attempts("alice").await.unwrap();
    assert!(ctx.store.get_login_attempts("alice").await.unwrap().is_none());
    assert!(!tracker.handle_locking("alice").await.unwrap());
}

#[tokio::test]
async fn test_login_rejected_while_locked_even_with_correct_password() {
    let ctx = helpers::TestContext::new().await;
    ctx.create_user("alice").await;
    let auth = &ctx.auth.authenticator;

    for _ in 0..helpers::THRESHOLD {
        let err = auth.login("alice", helpers::OTHER_PASSWORD).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    let err = auth.login("alice", helpers::STRONG_PASSWORD).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::LockedOut);

    // The rejected attempt slid the window, so waiting just under it again
    // is still locked.
    ctx.advance(helpers::TTL_MIN - 1);
    let err = auth.login("alice", helpers::STRONG_PASSWORD).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::LockedOut);

    ctx.advance(helpers::TTL_MIN);
    let result = auth.login("alice", helpers::STRONG_PASSWORD).await.unwrap();
    assert_eq!(result.user.username, "alice");
    assert!(ctx.store.get_login_attempts("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_user_is_locked_like_a_real_one() {
    let ctx = helpers::TestContext::new().await;
    let auth = &ctx.auth.authenticator;

    for _ in 0..helpers::THRESHOLD {
        let err = auth.login("ghost", helpers::STRONG_PASSWORD).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
    let err = auth.login("ghost", helpers::STRONG_PASSWORD).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::LockedOut);
}

#[tokio::test]
async fn test_store_failure_fails_closed() {
    let ctx = helpers::TestContext::new().await;
    ctx.create_user("alice").await;
    let tracker = tracker(&ctx);
    fail(&tracker, "alice", helpers::THRESHOLD).await;

    ctx.store.set_fail_writes(true);

    // Locked, and the sliding update cannot be written.
    assert!(tracker.handle_locking("alice").await.is_err());
    let err = ctx
        .auth
        .authenticator
        .login("alice", helpers::STRONG_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);

    // Not locked, correct password, but attempts cannot be reset.
    ctx.advance(helpers::TTL_MAX);
    let err = ctx
        .auth
        .authenticator
        .login("alice", helpers::STRONG_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);

    // Wrong password, and the failure cannot be counted.
    let err = ctx
        .auth
        .authenticator
        .login("alice", helpers::OTHER_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);

    ctx.store.set_fail_writes(false);
    assert!(
        ctx.auth
            .authenticator
            .login("alice", helpers::STRONG_PASSWORD)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_concurrent_failures_still_reach_the_window() {
    let ctx = helpers::TestContext::new().await;
    let tracker = Arc::new(tracker(&ctx));

    let handles: Vec<_> = (0..helpers::THRESHOLD * 2)
        .map(|_| {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.count_attempt("alice").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert!(tracker.handle_locking("alice").await.unwrap());
}

#[tokio::test]
async fn test_prune_removes_only_stale_unknown_usernames() {
    let ctx = helpers::TestContext::new().await;
    ctx.create_user("alice").await;
    let tracker = ctx.auth.authenticator.lockout();
    fail(tracker, "alice", helpers::THRESHOLD).await;
    fail(tracker, "ghost", helpers::THRESHOLD).await;

    let retention = tracker.policy().unknown_user_retention().num_seconds();
    ctx.advance(retention);
    fail(tracker, "phantom", 1).await;
    assert_eq!(tracker.prune_unknown_attempts().await.unwrap(), 0);

    ctx.advance(1);
    assert_eq!(tracker.prune_unknown_attempts().await.unwrap(), 1);
    assert!(ctx.store.get_login_attempts("ghost").await.unwrap().is_none());
    assert!(ctx.store.get_login_attempts("phantom").await.unwrap().is_some());

    // A real account keeps its counter however old it is.
    let row = ctx.store.get_login_attempts("alice").await.unwrap().unwrap();
    assert_eq!(row.count(), helpers::THRESHOLD);
}
