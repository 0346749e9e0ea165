//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::SurrealUserRepository;
use crate::schema::run_migrations;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address (e.g., `127.0.0.1:8000`).
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "rollcall".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Manages a connection to SurrealDB.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect, sign in as root, select the namespace and database, and
    /// apply any pending schema migrations.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        run_migrations(&db).await?;

        info!("User store ready");

        Ok(Self { db })
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }

    /// Build a user repository over this connection.
    pub fn user_repository(&self, pepper: Option<String>) -> SurrealUserRepository<Client> {
        match pepper {
            Some(p) => SurrealUserRepository::with_pepper(self.db.clone(), p),
            None => SurrealUserRepository::new(self.db.clone()),
        }
    }
}
