use crate::RfError;

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute + relative tolerance pair used when comparing simulated quantities.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, RfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(RfError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, RfError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(RfError::InvalidArg { what })
    }
}

/// Round a day count to the nearest whole day, halves away from zero.
pub fn round_days(days: Real) -> Result<i64, RfError> {
    let days = ensure_finite(days, "day count")?;
    let rounded = days.round();
    if rounded.abs() > i64::MAX as Real {
        return Err(RfError::InvalidArg {
            what: "day count exceeds i64 range",
        });
    }
    Ok(rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
        // relative branch carries large storages
        assert!(nearly_equal(2.178e10, 2.178e10 + 1.0, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(ensure_positive(0.0, "velocity").is_err());
        assert!(ensure_positive(-1.0, "velocity").is_err());
        assert_eq!(ensure_positive(1.5, "velocity").unwrap(), 1.5);
    }

    #[test]
    fn round_days_half_away_from_zero() {
        assert_eq!(round_days(0.49).unwrap(), 0);
        assert_eq!(round_days(0.5).unwrap(), 1);
        assert_eq!(round_days(1.5).unwrap(), 2);
        assert_eq!(round_days(2.5).unwrap(), 3);
        assert!(round_days(Real::INFINITY).is_err());
    }
}
