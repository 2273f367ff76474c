use crate::{
    config::DbConfig,
    error::{GetDatabaseConnectionSnafu, MigrateSnafu, OpenDatabaseSnafu, RosterResult},
};
use snafu::ResultExt;
use sqlx::{
    Pool, Sqlite, Transaction,
    pool::PoolConnection,
    sqlite::SqlitePoolOptions,
};
use std::ops::Deref;

/// Handle to the student store, handed to every route through axum's `State`.
#[derive(Clone, Debug)]
pub struct RosterState {
    pool: Pool<Sqlite>,
}

impl RosterState {
    pub async fn new(options: SqlitePoolOptions, db_config: &DbConfig) -> RosterResult<Self> {
        let pool = options
            .max_connections(db_config.max_connections())
            .connect_with(db_config.connect_options()?)
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let options = SqlitePoolOptions::new()
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::new(options, &DbConfig::in_memory())
            .await
            .expect("unable to create in-memory state")
    }

    pub async fn get_connection(&self) -> RosterResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }

    pub async fn get_transaction(&self) -> RosterResult<Transaction<'static, Sqlite>> {
        self.pool.begin().await.context(GetDatabaseConnectionSnafu)
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
    }
}

impl Deref for RosterState {
    type Target = Pool<Sqlite>;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
