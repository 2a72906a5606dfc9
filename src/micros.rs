use core::ops::{Add, AddAssign, Sub};

/// Unsigned microseconds, the unit of the tempo map
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UMicros(u64);

impl UMicros {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates a new instance of microseconds
    #[inline]
    pub const fn new(microseconds: u64) -> Self {
        Self(microseconds)
    }

    /// Returns the microseconds as a u64
    #[inline]
    pub const fn us(&self) -> u64 {
        self.0
    }

    /// ms -> us
    #[inline]
    pub const fn from_ms(ms: u64) -> Self {
        Self(ms * 1_000)
    }

    /// Returns whole milliseconds
    #[inline]
    pub const fn as_ms(&self) -> u64 {
        self.0 / 1_000
    }

    /// Returns seconds
    #[inline]
    pub const fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.
    }

    /// Returns no time if I am less than other.
    pub const fn saturating_sub(&self, other: Self) -> UMicros {
        UMicros(self.0.saturating_sub(other.0))
    }
}

impl Add for UMicros {
    type Output = UMicros;
    fn add(self, rhs: Self) -> Self::Output {
        UMicros(self.0 + rhs.0)
    }
}

impl AddAssign for UMicros {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for UMicros {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        UMicros(self.0 - rhs.0)
    }
}

impl From<UMicros> for core::time::Duration {
    fn from(value: UMicros) -> Self {
        core::time::Duration::from_micros(value.0)
    }
}

#[test]
fn micros_arithmetic() {
    use pretty_assertions::assert_eq;
    let mut a = UMicros::from_ms(3);
    a += UMicros::new(500);
    assert_eq!(a.us(), 3_500);
    assert_eq!(a.as_ms(), 3);
    assert_eq!(UMicros::ZERO.saturating_sub(a), UMicros::ZERO);
    assert_eq!((a - UMicros::new(500)) + UMicros::ZERO, UMicros::from_ms(3));
    assert_eq!(core::time::Duration::from(a).as_micros(), 3_500);
}
