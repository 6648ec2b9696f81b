use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Offset or length on the sheet, compared with a tolerance.
///
/// The uniform-item engine accumulates item sides as `f64` offsets, so
/// `3 × 0.1` has to compare equal to `0.3` and a column ending at `99.99999999` has to fit
/// a sheet edge at `100`. Equality goes through [`float_cmp::approx_eq!()`].
#[derive(Debug, Clone, Copy)]
pub struct FPA(pub f64);

impl FPA {
    const EPSILON: f64 = 1e-6;
    const ULPS: i64 = 4;

    /// Number of whole `step`s that fit in this length.
    /// A last step overshooting by less than the tolerance still counts.
    pub fn whole_steps(self, step: f64) -> usize {
        if self < FPA(step) {
            return 0;
        }
        let n = (self.0 / step).floor();
        match FPA((n + 1.0) * step) <= self {
            true => n as usize + 1,
            false => n as usize,
        }
    }

    /// Nearest coordinate on the integer grid of the sheet.
    pub fn to_grid(self) -> i32 {
        self.0.round() as i32
    }
}

impl PartialEq for FPA {
    fn eq(&self, other: &Self) -> bool {
        float_cmp::approx_eq!(
            f64,
            self.0,
            other.0,
            epsilon = Self::EPSILON,
            ulps = Self::ULPS
        )
    }
}

impl PartialOrd for FPA {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self == other {
            true => Some(Ordering::Equal),
            false => self.0.partial_cmp(&other.0),
        }
    }
}

impl Display for FPA {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
