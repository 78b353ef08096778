#[cfg(test)]
mod tests {
    use crate::auth::{SessionStore, User, UserSession};
    use crate::test::test_utils::{TestDb, TestDbBuilder};
    use chrono::Duration;

    async fn store_with_user(ttl: Duration) -> (SessionStore, User, TestDb) {
        let test_db = TestDbBuilder::new()
            .user("test_session_user")
            .build()
            .await
            .expect("Failed to build test database");

        let user = User {
            id: test_db
                .user_id("test_session_user")
                .expect("User not found"),
            username: "test_session_user".to_string(),
        };

        (SessionStore::new(test_db.pool.clone(), ttl), user, test_db)
    }

    #[tokio::test]
    async fn test_open_and_resolve_session() {
        let (store, user, _db) = store_with_user(Duration::hours(1)).await;

        let session = store.open(&user).await.expect("Failed to open session");

        assert!(session.id > 0, "Session ID should be positive");
        assert!(session.is_valid());

        let resolved = store
            .resolve(&session.token)
            .await
            .expect("Failed to resolve session")
            .expect("Session should resolve");

        assert_eq!(resolved.user(), user);
        assert_eq!(resolved.token, session.token);

        let expires_diff = (resolved.expires_at.and_utc().timestamp()
            - session.expires_at.and_utc().timestamp())
        .abs();
        assert!(
            expires_diff <= 1,
            "Expiration timestamps should match within 1 second"
        );
    }

    #[tokio::test]
    async fn test_unknown_token_resolves_to_none() {
        let (store, _user, _db) = store_with_user(Duration::hours(1)).await;

        let resolved = store.resolve("nonexistent_token").await.unwrap();

        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_revoke_session() {
        let (store, user, _db) = store_with_user(Duration::hours(1)).await;

        let session = store.open(&user).await.unwrap();

        assert!(store.revoke(&session.token).await.unwrap());
        assert!(store.resolve(&session.token).await.unwrap().is_none());

        // Revoking twice is harmless.
        assert!(!store.revoke(&session.token).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let (store, user, _db) = store_with_user(Duration::minutes(-5)).await;

        let session = store.open(&user).await.unwrap();

        assert!(!session.is_valid(), "Expired session should be invalid");
        assert!(store.resolve(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired_sessions() {
        let (live_store, user, test_db) = store_with_user(Duration::days(1)).await;
        let expired_store = SessionStore::new(test_db.pool.clone(), Duration::hours(-1));

        let expired = expired_store.open(&user).await.unwrap();
        let live = live_store.open(&user).await.unwrap();

        let cleaned = live_store
            .purge_expired()
            .await
            .expect("Failed to clean expired sessions");

        assert_eq!(cleaned, 1, "Should have cleaned exactly 1 expired session");

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_sessions")
            .fetch_one(&test_db.pool)
            .await
            .unwrap();
        assert_eq!(remaining, 1);

        assert!(live_store.resolve(&live.token).await.unwrap().is_some());
        assert!(live_store.resolve(&expired.token).await.unwrap().is_none());
    }

    #[test]
    fn test_generated_tokens_are_opaque_and_distinct() {
        let first = UserSession::generate_token();
        let second = UserSession::generate_token();

        assert_eq!(first.len(), 48);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
