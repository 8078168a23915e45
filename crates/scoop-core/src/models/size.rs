use std::fmt;
use std::str::FromStr;

use crate::error::DriveError;

/// Capacity unit accepted by the storage network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeUnit {
    Kb,
    Mb,
    Gb,
}

impl SizeUnit {
    /// Bytes per unit (binary multiples).
    pub fn bytes(self) -> u64 {
        match self {
            Self::Kb => 1 << 10,
            Self::Mb => 1 << 20,
            Self::Gb => 1 << 30,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kb => "KB",
            Self::Mb => "MB",
            Self::Gb => "GB",
        }
    }

    pub const ALL: [SizeUnit; 3] = [Self::Kb, Self::Mb, Self::Gb];
}

impl FromStr for SizeUnit {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KB" => Ok(Self::Kb),
            "MB" => Ok(Self::Mb),
            "GB" => Ok(Self::Gb),
            other => Err(DriveError::InvalidRequest(format!(
                "unknown size unit '{}' (use KB, MB or GB)",
                other
            ))),
        }
    }
}

/// A storage reservation such as `"500MB"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SizeSpec {
    amount: u64,
    unit: SizeUnit,
}

impl SizeSpec {
    /// Build a spec; the amount must be positive and the total must fit in `u64`.
    pub fn new(amount: u64, unit: SizeUnit) -> Result<Self, DriveError> {
        if amount == 0 {
            return Err(DriveError::InvalidRequest(
                "storage size must be greater than zero".to_string(),
            ));
        }
        if amount.checked_mul(unit.bytes()).is_none() {
            return Err(DriveError::InvalidRequest(format!(
                "storage size {}{} is too large",
                amount,
                unit.as_str()
            )));
        }
        Ok(Self { amount, unit })
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    /// Total reservation in bytes.
    pub fn bytes(&self) -> u64 {
        // Overflow is rejected in `new`
        self.amount * self.unit.bytes()
    }
}

impl FromStr for SizeSpec {
    type Err = DriveError;

    /// Parse `"<integer><unit>"`, e.g. `"10MB"` or `"1 gb"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);
        if digits.is_empty() {
            return Err(DriveError::InvalidRequest(format!(
                "'{}' is not a size (expected e.g. 500MB)",
                s
            )));
        }
        let amount = digits.parse::<u64>().map_err(|_| {
            DriveError::InvalidRequest(format!("storage size '{}' is too large", digits))
        })?;
        Self::new(amount, unit.parse()?)
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_spec() {
        let spec: SizeSpec = "500MB".parse().unwrap();
        assert_eq!(spec.amount(), 500);
        assert_eq!(spec.unit(), SizeUnit::Mb);
        assert_eq!(spec.bytes(), 500 * 1024 * 1024);
        assert_eq!(spec.to_string(), "500MB");

        assert_eq!("1 gb".parse::<SizeSpec>().unwrap().bytes(), 1 << 30);
        assert_eq!(" 10KB ".parse::<SizeSpec>().unwrap().bytes(), 10 * 1024);
    }

    #[test]
    fn test_reject_bad_size_spec() {
        assert!("".parse::<SizeSpec>().is_err());
        assert!("MB".parse::<SizeSpec>().is_err());
        assert!("0MB".parse::<SizeSpec>().is_err());
        assert!("12".parse::<SizeSpec>().is_err());
        assert!("12TB".parse::<SizeSpec>().is_err());
        assert!("-5MB".parse::<SizeSpec>().is_err());
        assert!("99999999999999999999GB".parse::<SizeSpec>().is_err());
        assert!("17179869184GB".parse::<SizeSpec>().is_err());
    }
}
