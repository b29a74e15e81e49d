//! Table layouts of the climate dataset.
//!
//! The dataset file is produced elsewhere; these definitions mirror it so the
//! service can check a file before serving it and tests can build fixtures.

use sqlx::SqlitePool;

pub const STATION_TABLE: &str = "station";
pub const MEASUREMENT_TABLE: &str = "measurement";

pub const TABLES: [&str; 2] = [STATION_TABLE, MEASUREMENT_TABLE];

/// Matches `domain::Station`.
pub const STATION_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS station (
        id INTEGER NOT NULL PRIMARY KEY,
        station TEXT NOT NULL UNIQUE,
        name TEXT,
        latitude FLOAT,
        longitude FLOAT,
        elevation FLOAT
    )
"#;

/// Matches `domain::Measurement`.
pub const MEASUREMENT_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS measurement (
        id INTEGER NOT NULL PRIMARY KEY,
        station TEXT NOT NULL REFERENCES station(station),
        date TEXT NOT NULL,
        prcp FLOAT,
        tobs FLOAT NOT NULL
    )
"#;

pub async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(STATION_DDL).execute(pool).await?;
    sqlx::query(MEASUREMENT_DDL).execute(pool).await?;

    Ok(())
}
