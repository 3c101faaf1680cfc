#[cfg(test)]
pub mod test_utils {
    use crate::auth::{Claims, JwtVerifier};
    use crate::fixtures::Dataset;
    use crate::messages::MessageCatalog;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::http::HeaderValue;
    use axum::Router;
    use axum_test::TestServer;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const TEST_JWT_SECRET: &str = "test-secret";

    /// Dataset every integration test starts from
    pub const DATABASE_INIT: &str = include_str!("../fixtures/database_init.yml");

    pub const ADMIN_ID: i32 = 1;
    pub const JOHN_ID: i32 = 2;
    pub const JANE_ID: i32 = 3;

    /// Category 1 has a subcategory with products, category 2 has none.
    pub const EXISTING_CATEGORY_ID: i32 = 1;
    pub const EMPTY_CATEGORY_ID: i32 = 2;
    pub const NONEXISTENT_ENTITY_ID: i32 = 100;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        // a single connection keeps the in-memory database alive and shared
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1);

        let db = Database::connect(options)
            .await
            .expect("Failed to connect to in-memory database");

        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, seeded with `DATABASE_INIT`
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        Dataset::from_yaml_str(DATABASE_INIT)
            .expect("Failed to parse test dataset")
            .load(&db)
            .await
            .expect("Failed to load test dataset");

        AppState {
            db,
            auth: Arc::new(JwtVerifier::new(TEST_JWT_SECRET)),
            messages: Arc::new(MessageCatalog::builtin()),
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _guard = init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state, Duration::from_secs(30))
    }

    pub async fn setup_test_server() -> TestServer {
        TestServer::new(setup_test_app().await).expect("Failed to start test server")
    }

    /// Sign a token the way the identity provider would
    pub fn token_for(user_id: i32, login: &str, roles: &[&str]) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: login.to_string(),
            uid: user_id,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: now + 3600,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("Failed to sign test token")
    }

    pub fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid header value")
    }

    pub fn admin_auth() -> HeaderValue {
        bearer(&token_for(ADMIN_ID, "admin", &["ROLE_ADMIN"]))
    }

    pub fn john_auth() -> HeaderValue {
        bearer(&token_for(JOHN_ID, "john", &["ROLE_USER"]))
    }
}
