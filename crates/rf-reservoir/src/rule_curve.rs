//! Annual rule-curve profiles and their expansion to daily series.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rf_core::{DailySeries, Volume};

use crate::error::{ReservoirError, ReservoirResult};
use crate::reservoir::Reservoir;

/// Daily target storage over a reservoir's simulation window.
pub type RuleCurve = DailySeries<Volume>;

/// One row of an annual profile: target storage for a calendar day.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileRow {
    pub month: u32,
    pub day: u32,
    pub target: Volume,
}

/// A 365-day target-storage schedule, keyed by (month, day).
///
/// February 29 is never stored; it resolves to February 28.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnualProfile {
    rows: Vec<ProfileRow>,
    lookup: HashMap<(u32, u32), Volume>,
}

impl AnnualProfile {
    /// A Feb 29 row is dropped; the leap day always takes the Feb 28 value.
    pub fn new(rows: Vec<ProfileRow>) -> ReservoirResult<Self> {
        let rows: Vec<ProfileRow> = rows
            .into_iter()
            .filter(|row| (row.month, row.day) != (2, 29))
            .collect();
        let mut lookup = HashMap::with_capacity(rows.len());
        for row in &rows {
            // 2001 is not a leap year, so impossible days fail to parse
            if NaiveDate::from_ymd_opt(2001, row.month, row.day).is_none() {
                return Err(ReservoirError::InvalidProfile {
                    what: format!("{:02}-{:02} is not a day of a non-leap year", row.month, row.day),
                });
            }
            if !row.target.is_finite() {
                return Err(ReservoirError::InvalidProfile {
                    what: format!("non-finite target on {:02}-{:02}", row.month, row.day),
                });
            }
            if lookup.insert((row.month, row.day), row.target).is_some() {
                return Err(ReservoirError::InvalidProfile {
                    what: format!("duplicate row for {:02}-{:02}", row.month, row.day),
                });
            }
        }
        Ok(Self { rows, lookup })
    }

    pub fn rows(&self) -> &[ProfileRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every day of a non-leap year is present.
    pub fn is_complete(&self) -> bool {
        self.rows.len() == 365
    }

    pub fn target(&self, month: u32, day: u32) -> ReservoirResult<Volume> {
        let key = if (month, day) == (2, 29) { (2, 28) } else { (month, day) };
        self.lookup
            .get(&key)
            .copied()
            .ok_or(ReservoirError::MissingProfileRow {
                month: key.0,
                day: key.1,
            })
    }
}

/// Expand an annual profile into a daily rule curve over `[start, end]`.
pub fn build_rule_curve(
    profile: &AnnualProfile,
    start: NaiveDate,
    end: NaiveDate,
) -> ReservoirResult<RuleCurve> {
    DailySeries::try_from_fn(start, end, |date| profile.target(date.month(), date.day()))
}

/// Supplies the annual profile for a reservoir.
pub trait RuleCurveSource {
    fn annual_profile(&self, reservoir: &Reservoir) -> ReservoirResult<AnnualProfile>;
}

impl RuleCurveSource for HashMap<u32, AnnualProfile> {
    fn annual_profile(&self, reservoir: &Reservoir) -> ReservoirResult<AnnualProfile> {
        self.get(&reservoir.id)
            .cloned()
            .ok_or_else(|| ReservoirError::ProfileUnavailable {
                reservoir: reservoir.id,
                reason: "no profile registered".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Full profile whose target is the day-of-year in acre-feet.
    fn day_of_year_profile() -> AnnualProfile {
        let rows = d(2001, 1, 1)
            .iter_days()
            .take(365)
            .map(|date| ProfileRow {
                month: date.month(),
                day: date.day(),
                target: Volume::from_acre_feet(date.ordinal() as f64),
            })
            .collect();
        AnnualProfile::new(rows).unwrap()
    }

    #[test]
    fn complete_profile() {
        let p = day_of_year_profile();
        assert!(p.is_complete());
        assert_eq!(p.rows()[58].month, 2);
        assert_eq!(p.rows()[58].day, 28);
    }

    #[test]
    fn leap_day_copies_feb_28() {
        let p = day_of_year_profile();
        let curve = build_rule_curve(&p, d(2004, 2, 27), d(2004, 3, 1)).unwrap();
        assert_eq!(curve.len(), 4);
        assert_eq!(curve.get(d(2004, 2, 29)), curve.get(d(2004, 2, 28)));
        assert_eq!(curve.get(d(2004, 2, 28)).unwrap().acre_feet(), 59.0);
        assert_eq!(curve.get(d(2004, 3, 1)).unwrap().acre_feet(), 60.0);
    }

    #[test]
    fn missing_row_reported() {
        let rows = vec![ProfileRow {
            month: 1,
            day: 1,
            target: Volume::from_acre_feet(1.0),
        }];
        let p = AnnualProfile::new(rows).unwrap();
        let err = build_rule_curve(&p, d(2001, 1, 1), d(2001, 1, 2)).unwrap_err();
        assert_eq!(err, ReservoirError::MissingProfileRow { month: 1, day: 2 });
    }

    #[test]
    fn leap_day_without_feb_28_reports_feb_28() {
        let p = AnnualProfile::new(vec![]).unwrap();
        let err = build_rule_curve(&p, d(2000, 2, 29), d(2000, 2, 29)).unwrap_err();
        assert_eq!(err, ReservoirError::MissingProfileRow { month: 2, day: 28 });
    }

    #[test]
    fn invalid_rows_rejected() {
        let row = |month, day| ProfileRow {
            month,
            day,
            target: Volume::from_acre_feet(1.0),
        };
        assert!(AnnualProfile::new(vec![row(13, 1)]).is_err());
        assert!(AnnualProfile::new(vec![row(2, 30)]).is_err());
        assert!(AnnualProfile::new(vec![row(3, 3), row(3, 3)]).is_err());
    }

    #[test]
    fn feb_29_row_is_dropped() {
        let row = |month, day, af| ProfileRow {
            month,
            day,
            target: Volume::from_acre_feet(af),
        };
        let p = AnnualProfile::new(vec![row(2, 28, 59.0), row(2, 29, 999.0), row(3, 1, 60.0)]).unwrap();
        assert_eq!(p.len(), 2);

        let curve = build_rule_curve(&p, d(2004, 2, 28), d(2004, 3, 1)).unwrap();
        assert_eq!(curve.get(d(2004, 2, 29)).unwrap().acre_feet(), 59.0);
    }

    #[test]
    fn empty_range_gives_empty_curve() {
        let p = day_of_year_profile();
        let curve = build_rule_curve(&p, d(2001, 6, 2), d(2001, 6, 1)).unwrap();
        assert!(curve.is_empty());
    }
}
