//! Binary direction label derived from a forward return.

use serde::{Deserialize, Serialize};

/// Direction of the forward return over the labeling horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Up,
    Down,
}

impl Label {
    /// Label from a realized forward return. `Up` iff the return strictly
    /// exceeds `threshold` (default 0.0 at call sites).
    pub fn from_return(forward_return: f64, threshold: f64) -> Self {
        if forward_return > threshold {
            Label::Up
        } else {
            Label::Down
        }
    }

    /// Numeric encoding used by the classifiers: Up = 1.0, Down = 0.0.
    pub fn as_f64(self) -> f64 {
        match self {
            Label::Up => 1.0,
            Label::Down => 0.0,
        }
    }

    pub fn is_up(self) -> bool {
        matches!(self, Label::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_from_return_sign() {
        assert_eq!(Label::from_return(0.01, 0.0), Label::Up);
        assert_eq!(Label::from_return(-0.01, 0.0), Label::Down);
    }

    #[test]
    fn zero_return_is_down() {
        // Boundary resolves down, consistent with the 0.5 probability tie.
        assert_eq!(Label::from_return(0.0, 0.0), Label::Down);
    }

    #[test]
    fn numeric_encoding() {
        assert_eq!(Label::Up.as_f64(), 1.0);
        assert_eq!(Label::Down.as_f64(), 0.0);
    }
}
