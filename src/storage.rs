use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use log::{debug, info, LevelFilter};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

use crate::configuration::DatabaseSettings;
use crate::domain::{self, DuplicateDatePolicy, Measurement, Station, TemperatureStats};
use crate::error::Error;
use crate::schema;

/// Read-only handle on the climate dataset.
///
/// Every query acquires its own pooled connection and returns it when the
/// query finishes, whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct Dataset {
    pool: SqlitePool,
}

impl Dataset {
    pub async fn open(settings: &DatabaseSettings) -> Result<Dataset, Error> {
        if !Path::new(&settings.path).exists() {
            return Err(Error::MissingDatabase(settings.path.clone()));
        }

        let options = SqliteConnectOptions::new()
            .filename(&settings.path)
            .read_only(true);
        let options = if settings.log_statements {
            options.log_statements(LevelFilter::Debug)
        } else {
            options.disable_statement_logging()
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        info!("Opened dataset {} (read-only)", settings.path);

        Ok(Dataset { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Dataset {
        Dataset { pool }
    }

    pub async fn verify_schema(&self) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        let present: Vec<String> =
            sqlx::query_scalar("select name from sqlite_master where type = 'table'")
                .fetch_all(&mut *conn)
                .await?;

        for table in schema::TABLES {
            if !present.iter().any(|name| name == table) {
                return Err(Error::MissingTable(table));
            }
        }

        Ok(())
    }

    pub async fn stations(&self) -> Result<Vec<String>, Error> {
        let mut conn = self.pool.acquire().await?;
        let stations = sqlx::query_as::<_, Station>(
            "select id, station, name, latitude, longitude, elevation
             from station
             order by id",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(stations.into_iter().map(|station| station.station).collect())
    }

    /// Precipitation per date over the last year of data.
    pub async fn precipitation(
        &self,
        policy: DuplicateDatePolicy,
    ) -> Result<BTreeMap<String, Option<f64>>, Error> {
        let mut conn = self.pool.acquire().await?;
        let cutoff = year_ago(&mut conn).await?;

        let measurements = sqlx::query_as::<_, Measurement>(
            "select id, station, date, prcp, tobs
             from measurement
             where date >= ?
             order by id",
        )
        .bind(&cutoff)
        .fetch_all(&mut *conn)
        .await?;

        debug!("{} precipitation rows since {}", measurements.len(), cutoff);

        Ok(domain::collapse_by_date(
            measurements.into_iter().map(|m| (m.date, m.prcp)),
            policy,
        ))
    }

    /// Temperature observations of the most active station over the last year of data.
    pub async fn tobs(&self) -> Result<Vec<f64>, Error> {
        let mut conn = self.pool.acquire().await?;
        let station = most_active_station(&mut conn).await?;
        let cutoff = year_ago(&mut conn).await?;

        let measurements = sqlx::query_as::<_, Measurement>(
            "select id, station, date, prcp, tobs
             from measurement
             where date >= ? and station = ?
             order by id",
        )
        .bind(&cutoff)
        .bind(&station)
        .fetch_all(&mut *conn)
        .await?;

        debug!("{} temperature rows for {} since {}", measurements.len(), station, cutoff);

        Ok(measurements.into_iter().map(|m| m.tobs).collect())
    }

    /// Dates are compared as text, so a malformed bound simply matches nothing.
    pub async fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, Error> {
        let mut conn = self.pool.acquire().await?;

        let stats = match end {
            Some(end) => {
                sqlx::query_as::<_, TemperatureStats>(
                    "select min(tobs) as tmin, avg(tobs) as tavg, max(tobs) as tmax
                     from measurement
                     where date >= ? and date <= ?",
                )
                .bind(start)
                .bind(end)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as::<_, TemperatureStats>(
                    "select min(tobs) as tmin, avg(tobs) as tavg, max(tobs) as tmax
                     from measurement
                     where date >= ?",
                )
                .bind(start)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(stats)
    }
}

async fn latest_date(conn: &mut SqliteConnection) -> Result<String, Error> {
    let latest: Option<String> = sqlx::query_scalar("select max(date) from measurement")
        .fetch_one(&mut *conn)
        .await?;

    latest.ok_or(Error::EmptyDataset)
}

async fn year_ago(conn: &mut SqliteConnection) -> Result<String, Error> {
    let latest = latest_date(conn).await?;
    domain::year_before(&latest)
}

/// Station with the most measurements; the lowest station code wins a tie.
async fn most_active_station(conn: &mut SqliteConnection) -> Result<String, Error> {
    let station: Option<String> = sqlx::query_scalar(
        "select station
         from measurement
         group by station
         order by count(*) desc, station asc
         limit 1",
    )
    .fetch_optional(&mut *conn)
    .await?;

    station.ok_or(Error::EmptyDataset)
}
