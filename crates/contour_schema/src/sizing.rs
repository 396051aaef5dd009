//! Count constraints on map entries and list items.

use std::fmt;

/// Sizing constraint attached to a map or list form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sizing {
    /// No constraint
    #[default]
    None,
    /// At least `n`
    Min(usize),
    /// At most `n`
    Max(usize),
    /// Between `min` and `max`, inclusive
    MinMax(usize, usize),
    /// Exactly `n`
    Exact(usize),
}

impl Sizing {
    /// Combine the optional bounds read from a form
    ///
    /// # Errors
    ///
    /// Returns a description of the conflict when `exact` is combined with
    /// a bound, or when `min` exceeds `max`
    pub fn from_bounds(
        min: Option<usize>,
        max: Option<usize>,
        exact: Option<usize>,
    ) -> Result<Self, String> {
        match (min, max, exact) {
            (None, None, None) => Ok(Self::None),
            (None, None, Some(n)) => Ok(Self::Exact(n)),
            (_, _, Some(_)) => Err("_exactCount without _min or _max".to_string()),
            (Some(min), None, None) => Ok(Self::Min(min)),
            (None, Some(max), None) => Ok(Self::Max(max)),
            (Some(min), Some(max), None) if min > max => {
                Err(format!("_min ({}) to be at most _max ({})", min, max))
            }
            (Some(min), Some(max), None) => Ok(Self::MinMax(min, max)),
        }
    }

    /// Whether this is the absent constraint
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// What a violating `count` should have been, or `None` when it satisfies
    /// the constraint
    #[must_use]
    pub fn violation(&self, count: usize) -> Option<String> {
        let (min, max) = match *self {
            Self::None => return None,
            Self::Exact(n) if count != n => return Some(format!("to have exactly {} entries", n)),
            Self::Exact(_) => return None,
            Self::Min(min) => (Some(min), None),
            Self::Max(max) => (None, Some(max)),
            Self::MinMax(min, max) => (Some(min), Some(max)),
        };
        match (min, max) {
            (Some(min), _) if count < min => Some(format!("to have at least {} entries", min)),
            (_, Some(max)) if count > max => Some(format!("to have at most {} entries", max)),
            _ => None,
        }
    }
}

impl fmt::Display for Sizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Min(min) => write!(f, "_min: {}", min),
            Self::Max(max) => write!(f, "_max: {}", max),
            Self::MinMax(min, max) => write!(f, "_min: {}, _max: {}", min, max),
            Self::Exact(n) => write!(f, "_exactCount: {}", n),
        }
    }
}
