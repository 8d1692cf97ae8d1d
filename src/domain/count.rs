use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// The number of counted vouches. Never negative.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct VouchCount(u64);

impl VouchCount {
    pub const ZERO: Self = Self(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// A no-op at zero.
    pub fn decremented(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl Display for VouchCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.to_string().as_str())
    }
}

impl FromStr for VouchCount {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

#[cfg(test)]
mod test {
    use super::VouchCount;

    #[test]
    fn decrement_floors_at_zero() {
        let two = VouchCount::ZERO.incremented().incremented();
        assert_eq!(two, "2".parse().unwrap());

        let zero = two.decremented().decremented();
        assert_eq!(zero, VouchCount::ZERO);
        assert_eq!(zero.decremented(), VouchCount::ZERO);
        assert!(zero.is_zero());
    }

    #[test]
    fn parsing() {
        assert_eq!("42".parse::<VouchCount>().unwrap().to_string(), "42");
        assert!("abc".parse::<VouchCount>().is_err());
        assert!("-1".parse::<VouchCount>().is_err());
        assert!("".parse::<VouchCount>().is_err());
    }
}
