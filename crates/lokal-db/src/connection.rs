//! SurrealDB connection setup and liveness checks.

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::{info, warn};

use crate::error::DbError;
use crate::schema::run_migrations;

/// Where and as whom the server connects.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `host:port` of the SurrealDB WebSocket endpoint.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "lokal".into(),
            database: "directory".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Owns the server's SurrealDB client.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open a WebSocket session, sign in as root and select the
    /// configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        info!("Connected to SurrealDB");
        Ok(Self { db })
    }

    /// Bring the schema up to date. Safe to call on every start.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.db).await
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }

    pub fn into_client(self) -> Surreal<Client> {
        self.db
    }
}

/// Round-trip a trivial query. Used by the health endpoint.
pub async fn ping<C: Connection>(db: &Surreal<C>) -> bool {
    match db.query("RETURN true").await.and_then(|r| r.check()) {
        Ok(_) => true,
        Err(err) => {
            warn!(error = %err, "SurrealDB ping failed");
            false
        }
    }
}
