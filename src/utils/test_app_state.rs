use std::sync::Arc;

use crate::{db_persistence::DbPersistence, http_server::AppState, Config};

pub async fn create_test_app_state() -> AppState {
    let config = Config::load_test_env().expect("Failed to load test configuration");
    let db = DbPersistence::with_max_connections(config.get_database_url(), config.data.max_connections)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations for tests");

    AppState::new(Arc::new(db), Arc::new(config))
}
