use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("product capacity bounds must be positive (minimum {minimum}, maximum {maximum})")]
    NotPositive { minimum: usize, maximum: usize },

    #[error("minimum products ({minimum}) exceeds maximum products ({maximum})")]
    Inverted { minimum: usize, maximum: usize },
}

/// Product count bounds for one submission batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capacity {
    minimum: usize,
    maximum: usize,
}

impl Capacity {
    pub fn new(minimum: usize, maximum: usize) -> Result<Self, CapacityError> {
        if minimum == 0 || maximum == 0 {
            return Err(CapacityError::NotPositive { minimum, maximum });
        }
        if minimum > maximum {
            return Err(CapacityError::Inverted { minimum, maximum });
        }
        Ok(Self { minimum, maximum })
    }

    pub fn minimum(&self) -> usize {
        self.minimum
    }

    pub fn maximum(&self) -> usize {
        self.maximum
    }

    /// Whether one more product fits after `current`
    pub fn can_add(&self, current: usize) -> bool {
        current < self.maximum
    }

    pub fn contains(&self, count: usize) -> bool {
        (self.minimum..=self.maximum).contains(&count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bounds() {
        let capacity = Capacity::new(3, 5).unwrap();
        assert_eq!(capacity.minimum(), 3);
        assert_eq!(capacity.maximum(), 5);
        assert!(capacity.can_add(4));
        assert!(!capacity.can_add(5));
        assert!(capacity.contains(3));
        assert!(!capacity.contains(2));
        assert!(!capacity.contains(6));
    }

    #[test]
    fn test_rejects_zero() {
        assert_eq!(
            Capacity::new(0, 5),
            Err(CapacityError::NotPositive {
                minimum: 0,
                maximum: 5
            })
        );
    }

    #[test]
    fn test_rejects_inverted() {
        assert!(matches!(
            Capacity::new(6, 5),
            Err(CapacityError::Inverted { .. })
        ));
    }

    #[test]
    fn test_equal_bounds_allowed() {
        assert!(Capacity::new(4, 4).is_ok());
    }
}
