use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};

use crate::model::error::DatabaseResult;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const MAX_CONNECTIONS: u32 = 16;

/// Shared Postgres pool. Clones share the same underlying connections.
#[derive(Debug, Clone)]
pub struct DbConnection {
    pool: PgPool,
}

impl DbConnection {
    /// Connections are opened on first use, so this never touches the network.
    pub fn connect(database_uri: &str) -> DatabaseResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy(database_uri)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the migrations embedded at build time. Already applied ones are skipped.
    pub async fn migrate(&self) -> DatabaseResult<()> {
        tracing::debug!("applying migrations...");
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }
}
