//! Postgres persistence for Roadwatch disaster reports.
//!
//! Owns the `reports` table and the `report_seq` sequence. The sequence is
//! the single issuance point for report numbers: concurrent workers each
//! call [`Database::next_report_seq`] and can never collide.

use roadwatch_report::Report;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::fmt;
use tracing::{debug, info};

/// Postgres unique_violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Database connection and report operations.
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("Database connection established");
        Ok(Self { pool })
    }

    /// Run versioned migrations (tracked in `_sqlx_migrations`).
    pub async fn migrate(&self) -> Result<(), DbError> {
        info!("Running database migrations...");
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Sqlx(Box::new(sqlx::Error::Protocol(e.to_string()))))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Issue the next report sequence number from the central sequence.
    pub async fn next_report_seq(&self) -> Result<i64, DbError> {
        let row = sqlx::query("SELECT nextval('report_seq') AS seq")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("seq")?)
    }

    /// Insert a finished report. A duplicate `report_id` maps to
    /// [`DbError::Conflict`]; reports are never updated after insert.
    pub async fn insert_report(&self, report: &Report) -> Result<(), DbError> {
        debug!(report_id = %report.report_id, "Inserting report");

        let result = sqlx::query(
            r#"
            INSERT INTO reports (
                report_id, disaster_type, latitude, longitude,
                road_id, mileage_label, distance_to_road_m,
                people_present, vehicles_present,
                photo_timestamp, upload_timestamp,
                reporter_id, photo_storage_key, summary_text
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&report.report_id)
        .bind(report.disaster_type.as_str())
        .bind(report.coordinates.latitude)
        .bind(report.coordinates.longitude)
        .bind(report.nearest_road.as_ref().map(|r| r.road_id.as_str()))
        .bind(report.nearest_road.as_ref().map(|r| r.mileage_label.as_str()))
        .bind(report.nearest_road.as_ref().map(|r| r.distance_meters))
        .bind(report.people_present)
        .bind(report.vehicles_present)
        .bind(report.photo_timestamp.as_deref())
        .bind(report.upload_timestamp)
        .bind(&report.reporter_id)
        .bind(&report.photo_storage_key)
        .bind(&report.summary_text)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(DbError::Conflict(report.report_id.clone()))
            }
            Err(e) => Err(DbError::Sqlx(Box::new(e))),
        }
    }
}

/// Errors from the report store.
#[derive(Debug)]
pub enum DbError {
    /// A report with this id already exists.
    Conflict(String),
    /// Any other database failure; treated as transient by callers.
    Sqlx(Box<sqlx::Error>),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Conflict(id) => write!(f, "Duplicate report id: {}", id),
            DbError::Sqlx(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Sqlx(e) => Some(e.as_ref()),
            DbError::Conflict(_) => None,
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        DbError::Sqlx(Box::new(e))
    }
}
