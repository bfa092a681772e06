//! Opening the store database.
//!
//! `database.url` selects the engine: `ws://host:port` talks to a SurrealDB
//! server and `mem://` runs an embedded in-memory instance. The binary and
//! the test suites share [`connect`], so both get the same namespace
//! selection and schema.

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Engine endpoint, e.g. `ws://127.0.0.1:8000` or `mem://`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root user. Empty skips sign-in; the embedded engine has no users.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000".into(),
            namespace: "delish".into(),
            database: "stores".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// A private, unauthenticated in-memory database.
    pub fn in_memory() -> Self {
        Self {
            url: "mem://".into(),
            username: String::new(),
            password: String::new(),
            ..Self::default()
        }
    }

    fn credentials(&self) -> Option<Root> {
        (!self.username.is_empty()).then(|| Root {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

/// Open the configured database and bring its schema up to date.
pub async fn connect(config: &DbConfig) -> Result<Surreal<Any>, DbError> {
    info!(
        url = %config.url,
        namespace = %config.namespace,
        database = %config.database,
        "Connecting to SurrealDB"
    );

    let db = any::connect(config.url.as_str()).await?;
    if let Some(root) = config.credentials() {
        db.signin(root).await?;
    }
    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await?;

    run_migrations(&db).await?;
    info!("Store database ready");

    Ok(db)
}
