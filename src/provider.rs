use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::models::{Creator, Platform, StablecoinBalance, StablecoinType};

pub trait DataProvider {
    fn balances(&self) -> Result<Vec<StablecoinBalance>>;
    fn creators(&self) -> Result<Vec<Creator>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MockProvider;

impl DataProvider for MockProvider {
    fn balances(&self) -> Result<Vec<StablecoinBalance>> {
        Ok(vec![
            balance(StablecoinType::Usdc, 5000.0, "USDC"),
            balance(StablecoinType::Usdt, 3500.0, "USDT"),
            balance(StablecoinType::Dai, 2000.0, "DAI"),
        ])
    }

    fn creators(&self) -> Result<Vec<Creator>> {
        Ok(vec![
            creator("1", "StreamerPro", Platform::Twitch, "streamer1", true),
            creator("2", "TechTuber", Platform::Youtube, "tech", true),
            creator("3", "GamingKing", Platform::Twitch, "gaming", false),
            creator("4", "ContentQueen", Platform::Youtube, "content", true),
        ])
    }
}

// Lists without a configured path come from MockProvider.
#[derive(Debug, Clone, Default)]
pub struct JsonFileProvider {
    creators_path: Option<PathBuf>,
    balances_path: Option<PathBuf>,
}

impl JsonFileProvider {
    pub fn new(creators_path: Option<PathBuf>, balances_path: Option<PathBuf>) -> Self {
        Self {
            creators_path,
            balances_path,
        }
    }
}

impl DataProvider for JsonFileProvider {
    fn balances(&self) -> Result<Vec<StablecoinBalance>> {
        match &self.balances_path {
            Some(path) => read_json_list(path),
            None => MockProvider.balances(),
        }
    }

    fn creators(&self) -> Result<Vec<Creator>> {
        match &self.creators_path {
            Some(path) => read_json_list(path),
            None => MockProvider.creators(),
        }
    }
}

pub fn total_balance(balances: &[StablecoinBalance]) -> f64 {
    balances.iter().map(|b| b.balance).sum()
}

fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("fixtureファイルを読めませんでした: path={}", path.display()))?;
    let items = serde_json::from_str(&raw)
        .with_context(|| format!("fixtureのJSON形式が不正です: path={}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded fixture file");
    Ok(items)
}

fn balance(kind: StablecoinType, amount: f64, symbol: &str) -> StablecoinBalance {
    StablecoinBalance {
        kind,
        balance: amount,
        symbol: symbol.to_string(),
    }
}

fn creator(id: &str, name: &str, platform: Platform, seed: &str, verified: bool) -> Creator {
    Creator {
        id: id.to_string(),
        name: name.to_string(),
        platform,
        avatar_url: format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}"),
        verified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn mock_total_balance() {
        let balances = MockProvider.balances().expect("balances");
        assert_eq!(total_balance(&balances), 10_500.0);
        assert_eq!(balances[0].kind, StablecoinType::Usdc);
    }

    #[test]
    fn creators_are_read_from_file() {
        let mut file = NamedTempFile::new().expect("tmp file");
        let body = serde_json::json!([
            {
                "id": "kick-1",
                "name": "KickRunner",
                "platform": "kick",
                "avatar": "https://example.com/k.svg",
                "verified": false
            }
        ]);
        write!(file, "{body}").expect("write fixture");

        let provider = JsonFileProvider::new(Some(file.path().to_path_buf()), None);
        let creators = provider.creators().expect("creators");
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].platform, Platform::Kick);

        // balances were not configured
        assert_eq!(provider.balances().expect("balances").len(), 3);
    }

    #[test]
    fn configured_but_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let provider = JsonFileProvider::new(Some(dir.path().join("creators.json")), None);
        assert!(provider.creators().is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().expect("tmp file");
        write!(file, "{{\"not\": \"a list\"}}").expect("write fixture");

        let provider = JsonFileProvider::new(None, Some(file.path().to_path_buf()));
        assert!(provider.balances().is_err());
    }
}
