use thiserror::Error;

///
/// Failure raised by any SQLite-backed store. Covers both the database
/// itself and decoding of JSON columns.
///
#[derive(Debug, Error)]
#[error("data layer error: {err}")]
pub struct DataLayerError {
    pub err: Box<dyn std::error::Error + Send + Sync>
}
pub type Result<T> = std::result::Result<T, DataLayerError>;

impl From<sqlx::Error> for DataLayerError {
    fn from(value: sqlx::Error) -> Self {
        Self { err: Box::new(value) }
    }
}

impl From<sqlx::migrate::MigrateError> for DataLayerError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self { err: Box::new(value) }
    }
}

impl From<serde_json::Error> for DataLayerError {
    fn from(value: serde_json::Error) -> Self {
        Self { err: Box::new(value) }
    }
}

///
/// Applies the bundled schema migrations to the given pool.
///
pub async fn migrate(db: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(db).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    // A single connection keeps every query on the same in-memory database
    let db = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&db).await.unwrap();
    db
}
