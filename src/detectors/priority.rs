//! Detector precedence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriorityError {
    #[error("Priority must be at least 1")]
    Zero,
}

/// Detector precedence: 1 is the most specific and is tried first
///
/// Ordering is ascending, so sorting a list of priorities yields evaluation
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Priority(NonZeroU16);

impl Priority {
    /// Panics at compile time when used in a const context with 0
    pub const fn of(value: u16) -> Self {
        match NonZeroU16::new(value) {
            Some(v) => Priority(v),
            None => panic!("priority must be at least 1"),
        }
    }

    pub fn get(self) -> u16 {
        self.0.get()
    }

    /// True when `self` is evaluated before `other`
    pub fn precedes(self, other: Priority) -> bool {
        self < other
    }
}

impl TryFrom<u16> for Priority {
    type Error = PriorityError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        NonZeroU16::new(value).map(Priority).ok_or(PriorityError::Zero)
    }
}

impl From<Priority> for u16 {
    fn from(priority: Priority) -> Self {
        priority.get()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_value_precedes() {
        assert!(Priority::of(1).precedes(Priority::of(10)));
        assert!(!Priority::of(10).precedes(Priority::of(1)));
        assert!(!Priority::of(3).precedes(Priority::of(3)));
    }

    #[test]
    fn test_sort_is_evaluation_order() {
        let mut priorities = vec![Priority::of(20), Priority::of(1), Priority::of(4)];
        priorities.sort();
        let values: Vec<u16> = priorities.into_iter().map(Priority::get).collect();
        assert_eq!(values, vec![1, 4, 20]);
    }

    #[test]
    fn test_zero_rejected() {
        assert_eq!(Priority::try_from(0), Err(PriorityError::Zero));
        assert_eq!(Priority::try_from(7).map(Priority::get), Ok(7));
    }

    #[test]
    #[should_panic(expected = "priority must be at least 1")]
    fn test_of_zero_panics() {
        let _ = Priority::of(std::hint::black_box(0));
    }

    #[test]
    fn test_serde_as_integer() {
        assert_eq!(serde_json::to_string(&Priority::of(3)).unwrap(), "3");
        let parsed: Priority = serde_json::from_str("12").unwrap();
        assert_eq!(parsed.get(), 12);
        assert!(serde_json::from_str::<Priority>("0").is_err());
    }
}
