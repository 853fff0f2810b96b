//! `RedisSessionStore` against a live Redis.
//!
//! Set `REFERRALSHARE_TEST_REDIS_URL` to run these; they are skipped
//! otherwise.

use std::time::Duration;

use referralshare_core::session::{RedisSessionStore, SessionStore, generate_token};

const REDIS_ENV: &str = "REFERRALSHARE_TEST_REDIS_URL";

async fn store(ttl: Duration) -> Option<RedisSessionStore> {
    let Ok(url) = std::env::var(REDIS_ENV) else {
        eprintln!("{REDIS_ENV} not set; skipping");
        return None;
    };
    let store = RedisSessionStore::connect(&url, 4, ttl, Duration::from_secs(5))
        .await
        .expect("connect to test redis");
    Some(store)
}

#[tokio::test]
async fn create_resolve_revoke() {
    let Some(store) = store(Duration::from_secs(60)).await else { return };

    let token = store.create("a@x.com").await.unwrap();
    assert_eq!(store.resolve(&token).await.unwrap().as_deref(), Some("a@x.com"));

    store.revoke(&token).await.unwrap();
    assert_eq!(store.resolve(&token).await.unwrap(), None);
    // Revoking again is a no-op.
    store.revoke(&token).await.unwrap();
}

#[tokio::test]
async fn unknown_token_is_absent_and_revocable() {
    let Some(store) = store(Duration::from_secs(60)).await else { return };
    let never_issued = generate_token();

    assert_eq!(store.resolve(&never_issued).await.unwrap(), None);
    store.revoke(&never_issued).await.unwrap();
    assert_eq!(store.resolve(&never_issued).await.unwrap(), None);
}

#[tokio::test]
async fn sessions_are_independent() {
    let Some(store) = store(Duration::from_secs(60)).await else { return };
    let a = store.create("a@x.com").await.unwrap();
    let b = store.create("b@x.com").await.unwrap();

    store.revoke(&a).await.unwrap();
    assert_eq!(store.resolve(&a).await.unwrap(), None);
    assert_eq!(store.resolve(&b).await.unwrap().as_deref(), Some("b@x.com"));
    store.revoke(&b).await.unwrap();
}

#[tokio::test]
async fn session_expires_after_ttl() {
    let Some(store) = store(Duration::from_secs(1)).await else { return };
    let token = store.create("a@x.com").await.unwrap();
    assert_eq!(store.resolve(&token).await.unwrap().as_deref(), Some("a@x.com"));

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(store.resolve(&token).await.unwrap(), None);
}
