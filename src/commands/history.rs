use anyhow::Result;

use crate::ledger::{HistoryFilter, Ledger};

use super::print_record;

pub fn run(ledger: &Ledger, filter: &HistoryFilter) -> Result<()> {
    let rows = ledger.filter(filter)?;

    if rows.is_empty() {
        println!("条件に一致する履歴はありません");
        return Ok(());
    }

    for row in &rows {
        print_record(row);
    }

    Ok(())
}
