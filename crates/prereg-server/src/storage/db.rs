//! Record store connection and write outcome.

pub use prereg_core::db::DatabaseError;

prereg_core::define_database!(RecordStore, "Record store migrations complete");

/// Failure outcome of a store write or read.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique-constrained field already holds the submitted value.
    #[error("{field} already exists")]
    Conflict { field: String },

    /// Any other store failure.
    #[error(transparent)]
    Failure(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match unique_violation_field(&e) {
            Some(field) => Self::Conflict { field },
            None => Self::Failure(e.into()),
        }
    }
}

/// Column named by a unique-constraint violation, if `e` is one.
///
/// `SQLite` reports these as `UNIQUE constraint failed: <table>.<column>`.
fn unique_violation_field(e: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db_err) = e else {
        return None;
    };
    if !db_err.is_unique_violation() {
        return None;
    }

    let column = db_err
        .message()
        .rsplit_once(": ")
        .and_then(|(_, columns)| columns.split(',').next())
        .map(|qualified| qualified.trim().rsplit('.').next().unwrap_or(qualified).to_string())
        .filter(|column| !column.is_empty());

    Some(column.unwrap_or_else(|| "record".to_string()))
}
