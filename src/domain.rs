use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the "last year of data" window, counted back from the latest date.
pub const YEAR_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Station {
    pub id: i64,
    pub station: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Measurement {
    pub id: i64,
    pub station: String,
    pub date: String,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

/// Min, mean and max temperature over a date range. All three are `None`
/// when no measurement falls in the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::FromRow)]
pub struct TemperatureStats {
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

/// What to do when several stations report precipitation for the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateDatePolicy {
    /// Last reading in table order wins.
    #[default]
    Last,
    First,
    /// Average of the non-null readings.
    Mean,
}

/// Cutoff for the last year of data ending at `latest`, both as `YYYY-MM-DD`.
pub fn year_before(latest: &str) -> Result<String, Error> {
    let latest = NaiveDate::parse_from_str(latest, DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(latest.to_string()))?;
    let cutoff = latest - Duration::days(YEAR_WINDOW_DAYS);

    Ok(cutoff.format(DATE_FORMAT).to_string())
}

pub fn collapse_by_date<I>(readings: I, policy: DuplicateDatePolicy) -> BTreeMap<String, Option<f64>>
where
    I: IntoIterator<Item = (String, Option<f64>)>,
{
    match policy {
        DuplicateDatePolicy::Last => readings.into_iter().collect(),
        DuplicateDatePolicy::First => {
            let mut by_date = BTreeMap::new();
            for (date, prcp) in readings {
                by_date.entry(date).or_insert(prcp);
            }
            by_date
        }
        DuplicateDatePolicy::Mean => {
            let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
            for (date, prcp) in readings {
                let (sum, count) = sums.entry(date).or_insert((0.0, 0));
                if let Some(prcp) = prcp {
                    *sum += prcp;
                    *count += 1;
                }
            }
            sums.into_iter()
                .map(|(date, (sum, count))| {
                    let mean = if count == 0 { None } else { Some(sum / count as f64) };
                    (date, mean)
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings() -> Vec<(String, Option<f64>)> {
        vec![
            ("2017-08-22".to_string(), Some(0.5)),
            ("2017-08-23".to_string(), Some(0.1)),
            ("2017-08-22".to_string(), None),
            ("2017-08-22".to_string(), Some(1.5)),
            ("2017-08-21".to_string(), None),
        ]
    }

    #[test]
    fn year_before_goes_back_365_days() {
        assert_eq!(year_before("2017-08-23").unwrap(), "2016-08-23");
        // 2016 is a leap year, so the window lands a day later in the calendar
        assert_eq!(year_before("2016-03-01").unwrap(), "2015-03-02");
    }

    #[test]
    fn year_before_rejects_malformed_dates() {
        match year_before("23/08/2017") {
            Err(Error::InvalidDate(date)) => assert_eq!(date, "23/08/2017"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn last_policy_keeps_the_final_reading() {
        let by_date = collapse_by_date(readings(), DuplicateDatePolicy::Last);

        assert_eq!(by_date.len(), 3);
        assert_eq!(by_date["2017-08-22"], Some(1.5));
        assert_eq!(by_date["2017-08-21"], None);
    }

    #[test]
    fn first_policy_keeps_the_earliest_reading() {
        let by_date = collapse_by_date(readings(), DuplicateDatePolicy::First);

        assert_eq!(by_date["2017-08-22"], Some(0.5));
        assert_eq!(by_date["2017-08-23"], Some(0.1));
    }

    #[test]
    fn mean_policy_skips_missing_readings() {
        let by_date = collapse_by_date(readings(), DuplicateDatePolicy::Mean);

        assert_eq!(by_date["2017-08-22"], Some(1.0));
        assert_eq!(by_date["2017-08-21"], None);
    }

    #[test]
    fn stats_serialize_with_upper_case_labels() {
        let empty = TemperatureStats { tmin: None, tavg: None, tmax: None };

        assert_eq!(
            serde_json::to_string(&empty).unwrap(),
            r#"{"TMIN":null,"TAVG":null,"TMAX":null}"#
        );
    }
}
