//! Conversion between playground steps and the internal fixed-point unit.

/// Internal units per playground step.
pub const PLAYGROUND_UNIT: i32 = 64;

/// Scale factor from external playground steps to internal units.
///
/// Every scaled coordinate goes through [`UnitScale::to_internal`], so there is
/// exactly one place where steps become internal units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitScale(i32);

impl UnitScale {
    /// The scale used by the simulation.
    pub const PLAYGROUND: UnitScale = UnitScale(PLAYGROUND_UNIT);
    /// One internal unit per step.
    pub const IDENTITY: UnitScale = UnitScale(1);

    /// Creates a scale. Returns `None` unless `factor` is positive.
    pub const fn new(factor: i32) -> Option<Self> {
        if factor > 0 {
            Some(Self(factor))
        } else {
            None
        }
    }

    #[inline]
    pub const fn factor(self) -> i32 {
        self.0
    }

    /// Steps to internal units.
    #[inline]
    pub const fn to_internal(self, steps: i32) -> i32 {
        steps * self.0
    }

    /// Internal units to whole steps, truncating toward zero.
    #[inline]
    pub const fn to_steps(self, internal: i32) -> i32 {
        internal / self.0
    }
}

impl Default for UnitScale {
    fn default() -> Self {
        Self::PLAYGROUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playground_scale_round_trips_whole_steps() {
        let scale = UnitScale::PLAYGROUND;
        assert_eq!(scale.to_internal(3), 3 * PLAYGROUND_UNIT);
        assert_eq!(scale.to_steps(scale.to_internal(-17)), -17);
    }

    #[test]
    fn test_to_steps_truncates() {
        let scale = UnitScale::PLAYGROUND;
        assert_eq!(scale.to_steps(PLAYGROUND_UNIT - 1), 0);
        assert_eq!(scale.to_steps(-(PLAYGROUND_UNIT - 1)), 0);
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        assert!(UnitScale::new(0).is_none());
        assert!(UnitScale::new(-4).is_none());
        assert_eq!(UnitScale::new(1), Some(UnitScale::IDENTITY));
    }
}
