#[cfg(test)]
pub mod test_utils {
    use crate::auth::{PasswordHasher, SessionStore, register_user};
    use crate::config::AppConfig;
    use crate::database::init_schema;
    use crate::error::AppError;
    use crate::init_rocket;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use sqlx::{Pool, Sqlite, sqlite::SqlitePoolOptions};
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    static TEST_SECRET_KEY: &str = "QkqUZee+wMludxnFonWHFZJy6v0HBnwW7y9/bmWeVxo=";

    // bcrypt's minimum; keeps the suite fast.
    pub const TEST_BCRYPT_COST: u32 = 4;

    pub fn test_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            bcrypt_cost: TEST_BCRYPT_COST,
            ..AppConfig::default()
        }
    }

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
    }

    pub struct TestUser {
        pub username: String,
        pub password: String,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn user(self, username: &str) -> Self {
            self.user_with_password(username, STANDARD_PASSWORD)
        }

        pub fn user_with_password(mut self, username: &str, password: &str) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                password: password.to_string(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter("debug")
                    .with_test_writer()
                    .try_init();
            });

            // One connection so every query sees the same in-memory database.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await?;

            init_schema(&pool).await?;

            let hasher = PasswordHasher::new(TEST_BCRYPT_COST);
            let mut user_id_map: HashMap<String, i64> = HashMap::new();

            for user in &self.users {
                let created =
                    register_user(&pool, &hasher, &user.username, &user.password).await?;
                user_id_map.insert(user.username.clone(), created.id);
            }

            Ok(TestDb { pool, user_id_map })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub user_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn user_id(&self, username: &str) -> Option<i64> {
            self.user_id_map.get(username).copied()
        }

        pub fn hasher(&self) -> PasswordHasher {
            PasswordHasher::new(TEST_BCRYPT_COST)
        }

        pub async fn stored_password(&self, username: &str) -> Result<String, sqlx::Error> {
            let (password,): (String,) =
                sqlx::query_as("SELECT password FROM users WHERE username = ?")
                    .bind(username)
                    .fetch_one(&self.pool)
                    .await?;

            Ok(password)
        }

        pub async fn user_count(&self) -> Result<i64, sqlx::Error> {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
                .fetch_one(&self.pool)
                .await?;

            Ok(count)
        }
    }

    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .user("alice")
            .user("bob")
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, Pool<Sqlite>) {
        let config = test_config();
        setup_test_client_with_ttl(test_db, config.session_ttl()).await
    }

    pub async fn setup_test_client_with_ttl(
        test_db: TestDb,
        ttl: chrono::Duration,
    ) -> (Client, Pool<Sqlite>) {
        let config = test_config();
        let pool = test_db.pool.clone();
        let sessions = SessionStore::new(pool.clone(), ttl);

        let figment = rocket::Config::figment().merge(("secret_key", TEST_SECRET_KEY));

        let rocket =
            init_rocket(figment, pool.clone(), sessions, &config).expect("Failed to build rocket");

        let client = Client::tracked(rocket)
            .await
            .expect("Failed to create test client");

        (client, pool)
    }

    pub fn form_body(username: &str, password: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", username)
            .append_pair("password", password)
            .finish()
    }

    pub async fn submit_form(
        client: &Client,
        path: &str,
        username: &str,
        password: &str,
    ) -> (Status, Option<String>, String) {
        let response = client
            .post(path)
            .header(ContentType::Form)
            .body(form_body(username, password))
            .dispatch()
            .await;

        let status = response.status();
        let location = response.headers().get_one("Location").map(String::from);
        let body = response.into_string().await.unwrap_or_default();

        (status, location, body)
    }

    pub async fn login_test_user(client: &Client, username: &str, password: &str) {
        let (status, location, _) = submit_form(client, "/login", username, password).await;

        assert_eq!(status, Status::SeeOther, "Login for {} failed", username);
        assert_eq!(location.as_deref(), Some("/dashboard"));
    }
}
