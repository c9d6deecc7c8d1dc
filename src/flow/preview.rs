use super::amount::DonationAmount;

pub const CONVERSION_RATE: f64 = 0.98;
pub const FEE_RATE: f64 = 0.02;

// Fee comes off on top of the conversion rate (about 4% in total).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    pub amount: f64,
    pub conversion_rate: f64,
    pub fee: f64,
    pub final_amount: f64,
}

pub fn compute_preview(amount: DonationAmount) -> Preview {
    let amount = amount.value();
    let fee = amount * FEE_RATE;
    let final_amount = amount * CONVERSION_RATE - fee;

    Preview {
        amount: round_cents(amount),
        conversion_rate: CONVERSION_RATE,
        fee: round_cents(fee),
        final_amount: round_cents(final_amount),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview_of(raw: &str) -> Preview {
        compute_preview(DonationAmount::parse(raw).expect("valid amount"))
    }

    #[test]
    fn hundred_leaves_ninety_six() {
        let preview = preview_of("100");
        assert_eq!(preview.fee, 2.0);
        assert_eq!(preview.final_amount, 96.0);
        assert_eq!(preview.conversion_rate, 0.98);
    }

    #[test]
    fn fifty_leaves_forty_eight() {
        let preview = preview_of("50");
        assert_eq!(preview.fee, 1.0);
        assert_eq!(preview.final_amount, 48.0);
    }

    #[test]
    fn small_amounts_round_to_cents() {
        let preview = preview_of("0.33");
        // fee 0.0066, final 0.3234 - 0.0066 = 0.3168
        assert_eq!(preview.fee, 0.01);
        assert_eq!(preview.final_amount, 0.32);
    }
}
