//! Core proof types for validated input.
//!
//! These types enforce invariants at construction time. Once you hold a value,
//! you know it satisfies all required constraints.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A wait duration in seconds, with sub-second precision.
///
/// # Invariants
///
/// - The value is finite and `>= 0.0`
/// - The value fits in a [`Duration`]
///
/// # Serde
///
/// Serializes as a plain JSON number. Deserialization validates the value and
/// fails if it is negative, NaN, infinite, or too large for a `Duration`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WaitSeconds {
    seconds: f64,
    duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidWaitSeconds {
    #[error("wait duration must not be negative (got {0})")]
    Negative(f64),
    #[error("wait duration must be a finite number")]
    NotFinite,
    #[error("wait duration is too large (got {0})")]
    TooLarge(f64),
}

impl WaitSeconds {
    pub const ZERO: Self = Self {
        seconds: 0.0,
        duration: Duration::ZERO,
    };

    pub fn new(seconds: f64) -> Result<Self, InvalidWaitSeconds> {
        if !seconds.is_finite() {
            return Err(InvalidWaitSeconds::NotFinite);
        }
        if seconds < 0.0 {
            return Err(InvalidWaitSeconds::Negative(seconds));
        }
        // -0.0 passes the check above; normalize so it prints as "0.0".
        let seconds = seconds.abs();
        let duration =
            Duration::try_from_secs_f64(seconds).map_err(|_| InvalidWaitSeconds::TooLarge(seconds))?;
        Ok(Self { seconds, duration })
    }

    #[must_use]
    pub const fn as_secs_f64(self) -> f64 {
        self.seconds
    }

    #[must_use]
    pub const fn as_duration(self) -> Duration {
        self.duration
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.duration.is_zero()
    }
}

impl TryFrom<f64> for WaitSeconds {
    type Error = InvalidWaitSeconds;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WaitSeconds> for f64 {
    fn from(value: WaitSeconds) -> Self {
        value.seconds
    }
}

/// Renders the requested value in shortest round-trip form.
///
/// Whole numbers keep a trailing `.0` (`1.0`, not `1`). Values below `1e-4`
/// or from `1e16` up switch to exponent form with a signed, two-digit
/// exponent (`1e-05`, `2.5e+16`).
impl fmt::Display for WaitSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.seconds;
        if value != 0.0 && !(1e-4..1e16).contains(&value) {
            let sci = format!("{value:e}");
            let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{mantissa}e{sign}{:02}", exponent.unsigned_abs())
        } else if value.fract() == 0.0 {
            write!(f, "{value:.1}")
        } else {
            write!(f, "{value}")
        }
    }
}
