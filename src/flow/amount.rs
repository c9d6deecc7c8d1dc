use std::fmt;

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DonationAmount(f64);

impl DonationAmount {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("amountが入力されていません"));
        }

        let value: f64 = trimmed
            .parse()
            .map_err(|_| anyhow!("amountが数値ではありません: {raw}"))?;

        if !value.is_finite() || value <= 0.0 {
            return Err(anyhow!("amountは0より大きく指定してください: {raw}"));
        }

        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for DonationAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_numbers() {
        assert_eq!(DonationAmount::parse("10").unwrap().value(), 10.0);
        assert_eq!(DonationAmount::parse(" 12.5 ").unwrap().value(), 12.5);
        assert_eq!(DonationAmount::parse("0.01").unwrap().to_string(), "0.01");
    }

    #[test]
    fn rejects_zero_negative_and_text() {
        for raw in ["", "   ", "0", "-5", "abc", "10abc", "NaN", "inf"] {
            assert!(DonationAmount::parse(raw).is_err(), "accepted {raw:?}");
        }
    }
}
