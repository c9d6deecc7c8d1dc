use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use rusqlite::types::Type;
use rusqlite::{Connection, Error as SqlError, ErrorCode, OptionalExtension, Row, params};

use crate::models::{NewTransaction, Platform, TransactionRecord, TransactionStatus};

// Session scoped: in-memory only.
pub struct Ledger {
    conn: Connection,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub platform: Option<Platform>,
    pub status: Option<TransactionStatus>,
    // inclusive bounds, anything SQLite's datetime() accepts
    pub since: Option<String>,
    pub until: Option<String>,
}

const SELECT_COLUMNS: &str = "
    SELECT id, creator_id, creator_name, platform, amount, stablecoin,
           status, tx_hash, fee, conversion_rate, created_at
    FROM transactions
";

impl Ledger {
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("in-memory DBを開けませんでした")?;
        let ledger = Self { conn };
        ledger.init_schema()?;
        ledger.seed_mock_history()?;
        Ok(ledger)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                creator_id TEXT NOT NULL,
                creator_name TEXT NOT NULL,
                platform TEXT NOT NULL,
                amount REAL NOT NULL,
                stablecoin TEXT NOT NULL,
                status TEXT NOT NULL,
                tx_hash TEXT UNIQUE,
                fee REAL NOT NULL,
                conversion_rate REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            ",
        )?;
        Ok(())
    }

    fn seed_mock_history(&self) -> Result<()> {
        let rows = [
            ("1", "StreamerPro", "twitch", 100.0, "usdc", "completed", Some("0x1234...5678"), 2.0, "-2 hours"),
            ("2", "TechTuber", "youtube", 50.0, "usdt", "completed", Some("0x5678...1234"), 1.0, "-24 hours"),
            ("3", "GamingKing", "twitch", 75.0, "dai", "pending", None, 1.5, "-5 minutes"),
        ];

        for (creator_id, name, platform, amount, coin, status, tx_hash, fee, age) in rows {
            self.conn.execute(
                "
                INSERT INTO transactions(
                    creator_id, creator_name, platform, amount, stablecoin,
                    status, tx_hash, fee, conversion_rate, created_at
                )
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0.98, datetime('now', ?9))
                ",
                params![creator_id, name, platform, amount, coin, status, tx_hash, fee, age],
            )?;
        }
        tracing::debug!(rows = rows.len(), "seeded mock history");
        Ok(())
    }

    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<TransactionRecord> {
        self.conn
            .execute(
                "
                INSERT INTO transactions(
                    creator_id, creator_name, platform, amount, stablecoin,
                    status, tx_hash, fee, conversion_rate
                )
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ",
                params![
                    tx.creator_id,
                    tx.creator_name,
                    tx.platform.as_str(),
                    tx.amount,
                    tx.stablecoin.as_str(),
                    tx.status.as_str(),
                    tx.tx_hash,
                    tx.fee,
                    tx.conversion_rate,
                ],
            )
            .map_err(map_unique_err)?;

        let id = self.conn.last_insert_rowid();
        self.get_transaction(id)?
            .ok_or_else(|| anyhow!("取引の登録後の読込に失敗しました: id={id}"))
    }

    pub fn get_transaction(&self, id: i64) -> Result<Option<TransactionRecord>> {
        self.conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                map_record,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn filter(&self, filter: &HistoryFilter) -> Result<Vec<TransactionRecord>> {
        let since = normalize_datetime(&self.conn, filter.since.as_deref())?;
        let until = normalize_datetime(&self.conn, filter.until.as_deref())?;

        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS}
            WHERE (?1 IS NULL OR platform = ?1)
              AND (?2 IS NULL OR status = ?2)
              AND (?3 IS NULL OR created_at >= ?3)
              AND (?4 IS NULL OR created_at <= ?4)
            ORDER BY created_at DESC, id DESC
            "
        ))?;

        let rows = stmt.query_map(
            params![
                filter.platform.map(Platform::as_str),
                filter.status.map(TransactionStatus::as_str),
                since,
                until,
            ],
            map_record,
        )?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

fn normalize_datetime(conn: &Connection, raw: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let normalized: Option<String> =
        conn.query_row("SELECT datetime(?1)", params![raw], |row| row.get(0))?;
    normalized
        .map(Some)
        .ok_or_else(|| anyhow!("日時の形式が不正です: {raw} (例: 2026-01-31 12:00:00)"))
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    Ok(TransactionRecord {
        id: row.get(0)?,
        creator_id: row.get(1)?,
        creator_name: row.get(2)?,
        platform: text_column(row, 3)?,
        amount: row.get(4)?,
        stablecoin: text_column(row, 5)?,
        status: text_column(row, 6)?,
        tx_hash: row.get(7)?,
        fee: row.get(8)?,
        conversion_rate: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn text_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|err: anyhow::Error| SqlError::FromSqlConversionFailure(idx, Type::Text, err.into()))
}

fn map_unique_err(err: SqlError) -> anyhow::Error {
    match err {
        SqlError::SqliteFailure(code, _) if code.code == ErrorCode::ConstraintViolation => {
            anyhow!("一意制約違反: 同じtx_hashの取引が既に登録されています")
        }
        other => anyhow!(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StablecoinType;

    fn donation(tx_hash: Option<&str>) -> NewTransaction {
        NewTransaction {
            creator_id: "4".to_string(),
            creator_name: "ContentQueen".to_string(),
            platform: Platform::Youtube,
            amount: 20.0,
            stablecoin: StablecoinType::Dai,
            status: TransactionStatus::Completed,
            tx_hash: tx_hash.map(ToString::to_string),
            fee: 0.4,
            conversion_rate: 0.98,
        }
    }

    #[test]
    fn seeded_history_is_filterable() {
        let ledger = Ledger::open_in_memory().expect("ledger");

        let all = ledger.filter(&HistoryFilter::default()).expect("all");
        let names: Vec<_> = all.iter().map(|r| r.creator_name.as_str()).collect();
        assert_eq!(names, ["GamingKing", "StreamerPro", "TechTuber"]);

        let twitch = ledger
            .filter(&HistoryFilter {
                platform: Some(Platform::Twitch),
                ..HistoryFilter::default()
            })
            .expect("twitch");
        assert_eq!(twitch.len(), 2);

        let pending = ledger
            .filter(&HistoryFilter {
                status: Some(TransactionStatus::Pending),
                ..HistoryFilter::default()
            })
            .expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].stablecoin, StablecoinType::Dai);
        assert!(pending[0].tx_hash.is_none());
    }

    #[test]
    fn date_range_is_inclusive_and_validated() {
        let ledger = Ledger::open_in_memory().expect("ledger");

        let recent = ledger
            .filter(&HistoryFilter {
                since: Some("now".to_string()),
                ..HistoryFilter::default()
            })
            .expect("since now");
        assert!(recent.is_empty());

        let last_day = ledger
            .filter(&HistoryFilter {
                since: Some("2000-01-01".to_string()),
                until: Some("9999-12-31 23:59:59".to_string()),
                ..HistoryFilter::default()
            })
            .expect("wide range");
        assert_eq!(last_day.len(), 3);

        let invalid = ledger.filter(&HistoryFilter {
            until: Some("yesterday-ish".to_string()),
            ..HistoryFilter::default()
        });
        assert!(invalid.is_err());
    }

    #[test]
    fn inserted_donation_comes_first() {
        let ledger = Ledger::open_in_memory().expect("ledger");
        let record = ledger.insert_transaction(&donation(None)).expect("insert");
        assert_eq!(record.platform, Platform::Youtube);
        assert_eq!(record.status, TransactionStatus::Completed);

        let all = ledger.filter(&HistoryFilter::default()).expect("all");
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, record.id);
    }

    #[test]
    fn duplicate_tx_hash_is_detected() {
        let ledger = Ledger::open_in_memory().expect("ledger");
        ledger
            .insert_transaction(&donation(Some("0xabc")))
            .expect("first insert");
        assert!(ledger.insert_transaction(&donation(Some("0xabc"))).is_err());

        // donations without a hash never collide
        ledger.insert_transaction(&donation(None)).expect("no hash");
        ledger.insert_transaction(&donation(None)).expect("no hash again");
    }
}
