use anyhow::Result;

use crate::provider::{DataProvider, total_balance};

pub fn run(provider: &dyn DataProvider) -> Result<()> {
    let balances = provider.balances()?;

    if balances.is_empty() {
        println!("残高はありません");
        return Ok(());
    }

    for balance in &balances {
        println!("{} ({}) {:.2}", balance.symbol, balance.kind, balance.balance);
    }
    println!("合計: ${:.2}", total_balance(&balances));
    Ok(())
}
