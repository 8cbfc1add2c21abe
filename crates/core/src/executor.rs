//! Query executor.
//!
//! Runs a route's statement with positional parameters on a pooled connection. Success and
//! failure both come back as values: rows, or a [`QueryError`] describing what the store
//! rejected. The connection returns to the pool when the query future completes, on every path.

use std::future::Future;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::{PgDatabaseError, PgPool, PgPoolOptions, PgRow, PgTypeInfo, PgTypeKind};
use sqlx::{Column, FromRow, Row, TypeInfo};

use crate::form::Param;
use crate::routes::Route;
use crate::rows::{Cell, OpaqueRow, RowKind, Rows};
use crate::{HastaneConfig, HastaneError, HastaneResult};

/// Failure descriptor rendered into a view's `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    pub message: String,
    /// SQLSTATE, when the store reported one.
    pub code: Option<String>,
    pub detail: Option<String>,
    pub constraint: Option<String>,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            detail: None,
            constraint: None,
        }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => Self {
                message: db.message().to_string(),
                code: db.code().map(|c| c.into_owned()),
                detail: db
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(|pg| pg.detail())
                    .map(str::to_string),
                constraint: db.constraint().map(str::to_string),
            },
            _ => Self::new(err.to_string()),
        }
    }
}

/// Executes route statements.
///
/// The dispatcher is generic over this so handlers can be exercised without a database.
pub trait StatementExecutor: Send + Sync + 'static {
    fn execute(
        &self,
        route: Route,
        params: Vec<Param>,
    ) -> impl Future<Output = Result<Rows, QueryError>> + Send;
}

/// PostgreSQL executor over a bounded connection pool.
#[derive(Clone, Debug)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    /// Build the pool without opening a connection; the first query connects.
    pub fn connect_lazy(cfg: &HastaneConfig) -> HastaneResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.pool_size())
            .connect_lazy_with(cfg.connect_options()?);
        Ok(Self { pool })
    }

    /// Build the pool and open a first connection, failing if the store is unreachable.
    pub async fn connect(cfg: &HastaneConfig) -> HastaneResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.pool_size())
            .connect_with(cfg.connect_options()?)
            .await
            .map_err(HastaneError::DatabaseConnect)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch<T>(&self, sql: &'static str, params: Vec<Param>) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut query = sqlx::query_as::<_, T>(sql);
        for param in params {
            query = query.bind(param);
        }
        query.fetch_all(&self.pool).await
    }

    async fn run(&self, route: Route, params: Vec<Param>) -> Result<Rows, sqlx::Error> {
        let statement = route.statement();
        let sql = statement.sql;

        let rows = match statement.rows {
            RowKind::None => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = query.bind(param);
                }
                let done = query.execute(&self.pool).await?;
                tracing::debug!("{} affected {} rows", route, done.rows_affected());
                Rows::default()
            }
            RowKind::Patient => Rows::Patients(self.fetch(sql, params).await?),
            RowKind::Doctor => Rows::Doctors(self.fetch(sql, params).await?),
            RowKind::Prescription => Rows::Prescriptions(self.fetch(sql, params).await?),
            RowKind::Examination => Rows::Examinations(self.fetch(sql, params).await?),
            RowKind::Appointment => Rows::Appointments(self.fetch(sql, params).await?),
            RowKind::DoctorAppointment => {
                Rows::DoctorAppointments(self.fetch(sql, params).await?)
            }
            RowKind::UserSummary => Rows::Users(self.fetch(sql, params).await?),
            RowKind::BusyDoctor => Rows::BusyDoctors(self.fetch(sql, params).await?),
            RowKind::Opaque => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = query.bind(param);
                }
                let raw = query.fetch_all(&self.pool).await?;
                Rows::Opaque(raw.iter().map(opaque_row).collect())
            }
        };

        Ok(rows)
    }
}

impl StatementExecutor for PgExecutor {
    async fn execute(&self, route: Route, params: Vec<Param>) -> Result<Rows, QueryError> {
        self.run(route, params).await.map_err(QueryError::from)
    }
}

/// Decode every column of a row into display text, by the column type the store reports.
///
/// Types without a dedicated arm are read as text; a cell that still cannot be decoded is null.
fn opaque_row(row: &PgRow) -> OpaqueRow {
    let cells = row
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| Cell {
            column: column.name().to_string(),
            value: cell_text(row, idx, column.type_info()),
        })
        .collect();
    OpaqueRow { cells }
}

fn cell_text(row: &PgRow, idx: usize, type_info: &PgTypeInfo) -> Option<String> {
    fn text<T: ToString>(value: Result<Option<T>, sqlx::Error>) -> Option<String> {
        value.ok().flatten().map(|v| v.to_string())
    }

    if let PgTypeKind::Enum(_) = type_info.kind() {
        return row.try_get_unchecked::<Option<String>, _>(idx).ok().flatten();
    }

    match type_info.name() {
        // Single-byte "char"; sqlx names bpchar plain CHAR.
        "\"CHAR\"" => text(row.try_get::<Option<i8>, _>(idx).map(|v| v.map(|b| b as u8 as char))),
        "INT2" => text(row.try_get::<Option<i16>, _>(idx)),
        "INT4" => text(row.try_get::<Option<i32>, _>(idx)),
        "INT8" => text(row.try_get::<Option<i64>, _>(idx)),
        "FLOAT4" => text(row.try_get::<Option<f32>, _>(idx)),
        "FLOAT8" => text(row.try_get::<Option<f64>, _>(idx)),
        "NUMERIC" => text(row.try_get::<Option<Decimal>, _>(idx)),
        "BOOL" => text(row.try_get::<Option<bool>, _>(idx)),
        "DATE" => text(row.try_get::<Option<NaiveDate>, _>(idx)),
        "TIME" => text(row.try_get::<Option<NaiveTime>, _>(idx)),
        "TIMESTAMP" => text(row.try_get::<Option<NaiveDateTime>, _>(idx)),
        "TIMESTAMPTZ" => text(row.try_get::<Option<DateTime<Utc>>, _>(idx)),
        _ => row.try_get::<Option<String>, _>(idx).ok().flatten(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_keep_their_message() {
        let err = QueryError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.message, sqlx::Error::PoolTimedOut.to_string());
        assert_eq!(err.code, None);
        assert_eq!(err.constraint, None);
    }

    #[test]
    fn query_error_serializes_for_views() {
        let err = QueryError {
            message: "duplicate key value violates unique constraint \"hasta_pkey\"".into(),
            code: Some("23505".into()),
            detail: Some("Key (tc)=(1) already exists.".into()),
            constraint: Some("hasta_pkey".into()),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "23505");
        assert_eq!(json["constraint"], "hasta_pkey");
        assert_eq!(err.to_string(), err.message);
    }
}
