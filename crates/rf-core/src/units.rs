// rf-core/src/units.rs

use core::fmt;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use uom::si::f64::{Length as UomLength, Time as UomTime, Velocity as UomVelocity};

// Public canonical unit types for routing geometry (SI, f64)
pub type Length = UomLength;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

/// Seconds in one simulation day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Cubic feet in one acre-foot (exact).
pub const FT3_PER_ACRE_FOOT: f64 = 43_560.0;

/// Cubic feet per second in one cubic meter per second (exact: 1 ft = 0.3048 m).
pub const CFS_PER_CMS: f64 = (1000.0 / 25.4 / 12.0) * (1000.0 / 25.4 / 12.0) * (1000.0 / 25.4 / 12.0);

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

/// Travel time of a wave over `distance` at `velocity`, in (fractional) days.
#[inline]
pub fn travel_days(distance: Length, velocity: Velocity) -> f64 {
    use uom::si::time::day;
    let t: Time = distance / velocity;
    t.get::<day>()
}

/// Stored water volume. Canonical unit is the cubic foot.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Volume(f64);

impl Volume {
    pub const ZERO: Volume = Volume(0.0);

    #[inline]
    pub fn from_cubic_feet(v: f64) -> Self {
        Self(v)
    }

    #[inline]
    pub fn from_acre_feet(v: f64) -> Self {
        Self(v * FT3_PER_ACRE_FOOT)
    }

    #[inline]
    pub fn cubic_feet(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn acre_feet(self) -> f64 {
        self.0 / FT3_PER_ACRE_FOOT
    }

    /// Constant flow that moves this volume in one day.
    #[inline]
    pub fn per_day(self) -> Flow {
        Flow(self.0 / SECONDS_PER_DAY)
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} af", self.acre_feet())
    }
}

/// Volumetric flow rate. Canonical unit is cubic feet per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flow(f64);

impl Flow {
    pub const ZERO: Flow = Flow(0.0);

    #[inline]
    pub fn from_cfs(v: f64) -> Self {
        Self(v)
    }

    #[inline]
    pub fn from_cms(v: f64) -> Self {
        Self(v * CFS_PER_CMS)
    }

    #[inline]
    pub fn cfs(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn cms(self) -> f64 {
        self.0 / CFS_PER_CMS
    }

    /// Volume delivered by this flow over one day.
    #[inline]
    pub fn over_day(self) -> Volume {
        Volume(self.0 * SECONDS_PER_DAY)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} cfs", self.0)
    }
}

macro_rules! impl_linear_ops {
    ($ty:ident) => {
        impl Add for $ty {
            type Output = $ty;
            #[inline]
            fn add(self, rhs: $ty) -> $ty {
                $ty(self.0 + rhs.0)
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            #[inline]
            fn sub(self, rhs: $ty) -> $ty {
                $ty(self.0 - rhs.0)
            }
        }

        impl AddAssign for $ty {
            #[inline]
            fn add_assign(&mut self, rhs: $ty) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $ty {
            #[inline]
            fn sub_assign(&mut self, rhs: $ty) {
                self.0 -= rhs.0;
            }
        }

        impl Neg for $ty {
            type Output = $ty;
            #[inline]
            fn neg(self) -> $ty {
                $ty(-self.0)
            }
        }

        impl Mul<f64> for $ty {
            type Output = $ty;
            #[inline]
            fn mul(self, rhs: f64) -> $ty {
                $ty(self.0 * rhs)
            }
        }
    };
}

impl_linear_ops!(Volume);
impl_linear_ops!(Flow);
