use anyhow::Result;

use crate::flow::{DonationAmount, compute_preview};

use super::print_preview;

pub fn run(amount: &str) -> Result<()> {
    let amount = DonationAmount::parse(amount)?;
    let preview = compute_preview(amount);

    println!("送金プレビュー");
    print_preview(&preview);
    Ok(())
}
