pub mod balances;
pub mod creators;
pub mod history;
pub mod preview;
pub mod session;

use crate::flow::Preview;
use crate::models::{Creator, TransactionRecord};

fn print_creator(creator: &Creator) {
    let badge = if creator.verified { " ✓" } else { "" };
    println!(
        "id={} name={}{} platform={} avatar={}",
        creator.id, creator.name, badge, creator.platform, creator.avatar_url
    );
}

fn print_preview(preview: &Preview) {
    println!("  amount          ${:.2}", preview.amount);
    println!("  conversion rate {:.1}%", preview.conversion_rate * 100.0);
    println!("  fee (2%)        -${:.2}", preview.fee);
    println!("  creator受取額   ${:.2}", preview.final_amount);
}

fn print_record(row: &TransactionRecord) {
    let tx_hash = row.tx_hash.as_deref().unwrap_or("-");
    println!(
        "id={} creator={} ({}) platform={} amount={} {} fee={} rate={} status={} tx={} at={}",
        row.id,
        row.creator_name,
        row.creator_id,
        row.platform,
        row.amount,
        row.stablecoin,
        row.fee,
        row.conversion_rate,
        row.status.as_str(),
        tx_hash,
        row.created_at
    );
}
