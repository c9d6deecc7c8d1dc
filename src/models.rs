use std::fmt;
use std::str::FromStr;

use anyhow::{Error, anyhow};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Youtube,
    Kick,
    Rumble,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Twitch,
        Platform::Youtube,
        Platform::Kick,
        Platform::Rumble,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Twitch => "twitch",
            Platform::Youtube => "youtube",
            Platform::Kick => "kick",
            Platform::Rumble => "rumble",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("未対応のplatformです: {s} (twitch/youtube/kick/rumble)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StablecoinType {
    Usdc,
    Usdt,
    Dai,
}

impl StablecoinType {
    pub fn as_str(self) -> &'static str {
        match self {
            StablecoinType::Usdc => "usdc",
            StablecoinType::Usdt => "usdt",
            StablecoinType::Dai => "dai",
        }
    }
}

impl fmt::Display for StablecoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StablecoinType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usdc" => Ok(StablecoinType::Usdc),
            "usdt" => Ok(StablecoinType::Usdt),
            "dai" => Ok(StablecoinType::Dai),
            _ => Err(anyhow!("未対応のstablecoinです: {s} (usdc/usdt/dai)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StablecoinBalance {
    #[serde(rename = "type")]
    pub kind: StablecoinType,
    pub balance: f64,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    #[serde(rename = "avatar")]
    pub avatar_url: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(anyhow!("不明なstatusです: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub creator_id: String,
    pub creator_name: String,
    pub platform: Platform,
    pub amount: f64,
    pub stablecoin: StablecoinType,
    pub status: TransactionStatus,
    pub tx_hash: Option<String>,
    pub fee: f64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub id: i64,
    pub creator_id: String,
    pub creator_name: String,
    pub platform: Platform,
    pub amount: f64,
    pub stablecoin: StablecoinType,
    pub status: TransactionStatus,
    pub tx_hash: Option<String>,
    pub fee: f64,
    pub conversion_rate: f64,
    pub created_at: String,
}
