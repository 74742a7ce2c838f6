//! Integration tests for register, login, and token authentication.

mod helpers;

use filehub_auth::{Actor, HashVersion, PasswordHashingRegistry};
use filehub_core::error::{ErrorKind, INVALID_CREDENTIALS};
use filehub_core::types::OwnerId;
use filehub_database::IdentityStore;
use filehub_entity::user::NewUser;

#[tokio::test]
async fn test_register_and_login() {
    let ctx = helpers::TestContext::new().await;
    let user = ctx.create_user("alice").await;
    assert!(!user.admin);
    assert_eq!(user.hash_version, HashVersion::LATEST.tag());

    let result = ctx
        .auth
        .authenticator
        .login("alice", helpers::STRONG_PASSWORD)
        .await
        .unwrap();
    assert_eq!(result.user.owner_id, user.owner_id);
    assert_eq!(ctx.auth.tokens.verify_token(&result.token).unwrap(), "alice");

    let serialized = serde_json::to_value(&result).unwrap();
    assert!(serialized["user"].get("hash").is_none());
    assert!(serialized["user"].get("salt").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_weak_input() {
    let ctx = helpers::TestContext::new().await;
    ctx.create_user("alice").await;
    let auth = &ctx.auth.authenticator;

    let err = auth
        .register("alice", helpers::OTHER_PASSWORD, serde_json::json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = auth
        .register("bob", "short", serde_json::json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = auth
        .register("bob", "password", serde_json::json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = auth
        .register("bad name", helpers::STRONG_PASSWORD, serde_json::json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
    let ctx = helpers::TestContext::new().await;
    ctx.create_user("alice").await;
    let auth = &ctx.auth.authenticator;

    let wrong = auth.login("alice", helpers::OTHER_PASSWORD).await.unwrap_err();
    let unknown = auth.login("nobody", helpers::OTHER_PASSWORD).await.unwrap_err();

    assert_eq!(wrong.kind, ErrorKind::Authentication);
    assert_eq!(wrong.kind, unknown.kind);
    assert_eq!(wrong.message, INVALID_CREDENTIALS);
    assert_eq!(wrong.message, unknown.message);

    // Both count an attempt.
    for username in ["alice", "nobody"] {
        let row = ctx.store.get_login_attempts(username).await.unwrap().unwrap();
        assert_eq!(row.count(), 1);
    }
}

#[tokio::test]
async fn test_success_resets_attempts_and_never_creates_a_row() {
    let ctx = helpers::TestContext::new().await;
    ctx.create_user("alice").await;
    let auth = &ctx.auth.authenticator;

    auth.login("alice", helpers::STRONG_PASSWORD).await.unwrap();
    assert!(ctx.store.get_login_attempts("alice").await.unwrap().is_none());

    auth.login("alice", helpers::OTHER_PASSWORD).await.unwrap_err();
    auth.login("alice", helpers::OTHER_PASSWORD).await.unwrap_err();
    assert_eq!(
        ctx.store.get_login_attempts("alice").await.unwrap().unwrap().count(),
        2
    );

    auth.login("alice", helpers::STRONG_PASSWORD).await.unwrap();
    assert!(ctx.store.get_login_attempts("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_hash_is_migrated_on_login() {
    let ctx = helpers::TestContext::new().await;
    let legacy = HashVersion::V1.hash_password(helpers::STRONG_PASSWORD).unwrap();
    ctx.store
        .add_user(&NewUser {
            username: "carol".to_string(),
            owner_id: OwnerId::new(),
            hash_version: legacy.version.tag().to_string(),
            salt: legacy.salt.clone(),
            hash: legacy.hash.clone(),
            admin: false,
            meta: serde_json::json!({}),
        })
        .await
        .unwrap();

    let result = ctx
        .auth
        .authenticator
        .login("carol", helpers::STRONG_PASSWORD)
        .await
        .unwrap();
    assert_eq!(result.user.hash_version, HashVersion::LATEST.tag());

    let stored = ctx.store.get_user("carol").await.unwrap().unwrap();
    assert_eq!(stored.hash_version, HashVersion::LATEST.tag());
    assert_ne!(stored.hash, legacy.hash);

    let registry = PasswordHashingRegistry::new();
    assert!(registry.check_password(
        &stored.hash_version,
        helpers::STRONG_PASSWORD,
        &stored.salt,
        &stored.hash
    ));

    // And the migrated user still logs in.
    ctx.auth
        .authenticator
        .login("carol", helpers::STRONG_PASSWORD)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_corrupt_stored_hash_is_a_failed_login() {
    let ctx = helpers::TestContext::new().await;
    ctx.store
        .add_user(&NewUser {
            username: "dave".to_string(),
            owner_id: OwnerId::new(),
            hash_version: "7".to_string(),
            salt: "%%%".to_string(),
            hash: "not base64".to_string(),
            admin: false,
            meta: serde_json::json!({}),
        })
        .await
        .unwrap();

    let err = ctx
        .auth
        .authenticator
        .login("dave", helpers::STRONG_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.message, INVALID_CREDENTIALS);
}

#[tokio::test]
async fn test_authenticate_resolves_current_user() {
    let ctx = helpers::TestContext::new().await;
    let user = ctx.create_user("alice").await;
    let auth = &ctx.auth.authenticator;
    let token = auth.login("alice", helpers::STRONG_PASSWORD).await.unwrap().token;

    let resolved = auth.authenticate(Some(&token)).await.unwrap();
    assert_eq!(resolved.owner_id, user.owner_id);

    let err = auth.authenticate(None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);

    // A token for a user that does not exist is just an invalid token.
    let orphan = ctx.auth.tokens.issue_token("ghost").unwrap();
    let err = auth.authenticate(Some(&orphan)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_actor_from_token() {
    let ctx = helpers::TestContext::new().await;
    ctx.create_user("alice").await;
    let auth = &ctx.auth.authenticator;
    let token = auth.login("alice", helpers::STRONG_PASSWORD).await.unwrap().token;

    assert_eq!(auth.actor(None).await.unwrap(), Actor::Anonymous);
    let actor = auth.actor(Some(&token)).await.unwrap();
    assert_eq!(actor.principal().unwrap().username, "alice");
    assert!(!actor.is_admin());

    auth.set_admin("alice", true).await.unwrap();
    assert!(auth.actor(Some(&token)).await.unwrap().is_admin());

    assert!(auth.actor(Some("garbage")).await.is_err());
}

#[tokio::test]
async fn test_change_password() {
    let ctx = helpers::TestContext::new().await;
    ctx.create_user("alice").await;
    let auth = &ctx.auth.authenticator;

    let err = auth
        .change_password("alice", helpers::OTHER_PASSWORD, helpers::OTHER_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.message, INVALID_CREDENTIALS);

    let err = auth
        .change_password("alice", helpers::STRONG_PASSWORD, helpers::STRONG_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    auth.change_password("alice", helpers::STRONG_PASSWORD, helpers::OTHER_PASSWORD)
        .await
        .unwrap();

    assert!(auth.login("alice", helpers::STRONG_PASSWORD).await.is_err());
    assert!(auth.login("alice", helpers::OTHER_PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_set_admin_unknown_user() {
    let ctx = helpers::TestContext::new().await;
    let err = ctx
        .auth
        .authenticator
        .set_admin("nobody", true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
