//! Immutable lookup tables backing every fetch operation.
//!
//! The tables are built once at start-up, either from the built-in seed data
//! or from a YAML/JSON data file, and shared read-only behind an `Arc`.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Descriptive record stored per ticker in the coin table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoinProfile {
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub website: String,
}

/// Price table and coin table.
///
/// # Examples
///
/// ```
/// use price_fetcher::domain::MarketData;
///
/// let data = MarketData::builtin();
/// assert_eq!(data.price("BTC"), Some(20_000.0));
/// assert!(data.profile("BTC").is_some());
/// assert!(data.price("btc").is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketData {
    #[serde(default)]
    prices: HashMap<String, f64>,
    #[serde(default)]
    coins: HashMap<String, CoinProfile>,
}

impl MarketData {
    /// Build tables from explicit entries, rejecting unusable prices.
    pub fn new(
        prices: HashMap<String, f64>,
        coins: HashMap<String, CoinProfile>,
    ) -> anyhow::Result<Self> {
        let data = Self { prices, coins };
        data.validate()?;
        Ok(data)
    }

    /// Load tables from a YAML (or JSON) file.
    ///
    /// Expected shape:
    ///
    /// ```yaml
    /// prices:
    ///   BTC: 20000
    /// coins:
    ///   BTC:
    ///     name: Bitcoin
    ///     category: Layer 1
    ///     description: The original decentralised cryptocurrency.
    ///     tags: [pow]
    ///     website: https://bitcoin.org
    /// ```
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read market data file {}", path.display()))?;
        let data: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse market data file {}", path.display()))?;
        data.validate()
            .with_context(|| format!("Invalid market data file {}", path.display()))?;
        Ok(data)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.prices.is_empty() {
            anyhow::bail!("Price table is empty");
        }
        for (ticker, price) in &self.prices {
            if !price.is_finite() || *price <= 0.0 {
                anyhow::bail!("Invalid price {} for ticker {}", price, ticker);
            }
        }
        Ok(())
    }

    /// Seed tables compiled into the binary.
    pub fn builtin() -> Self {
        let prices = SEED_PRICES
            .iter()
            .map(|(ticker, price)| (ticker.to_string(), *price))
            .collect();
        let coins = SEED_COINS
            .iter()
            .map(|(ticker, name, category, description, tags, website)| {
                (
                    ticker.to_string(),
                    CoinProfile {
                        name: name.to_string(),
                        category: category.to_string(),
                        description: description.to_string(),
                        tags: tags.iter().map(|t| t.to_string()).collect(),
                        website: website.to_string(),
                    },
                )
            })
            .collect();
        Self { prices, coins }
    }

    pub fn price(&self, ticker: &str) -> Option<f64> {
        self.prices.get(ticker).copied()
    }

    pub fn profile(&self, ticker: &str) -> Option<&CoinProfile> {
        self.coins.get(ticker)
    }

    /// All priced tickers, ascending.
    pub fn sorted_tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.prices.keys().cloned().collect();
        tickers.sort();
        tickers
    }

    pub fn ticker_count(&self) -> usize {
        self.prices.len()
    }
}

const SEED_PRICES: &[(&str, f64)] = &[
    // Layer 1
    ("BTC", 20_000.0),
    ("ETH", 2_000.0),
    ("SOL", 150.0),
    ("BNB", 300.0),
    ("ADA", 0.45),
    ("AVAX", 35.0),
    ("DOT", 7.5),
    ("MATIC", 0.85),
    ("TRX", 0.08),
    ("TON", 2.10),
    ("NEAR", 3.50),
    ("ICP", 5.20),
    ("FTM", 0.40),
    ("ALGO", 0.17),
    // DeFi and L2
    ("ARB", 1.20),
    ("OP", 1.80),
    ("LINK", 14.50),
    ("UNI", 6.30),
    ("AAVE", 95.0),
    ("CRV", 0.55),
    ("MKR", 1_200.0),
    ("SNX", 2.80),
    ("LDO", 2.10),
    ("GRT", 0.14),
    // Stablecoins
    ("USDT", 1.00),
    ("USDC", 1.00),
    ("DAI", 1.00),
    ("FRAX", 1.00),
    ("TUSD", 1.00),
    // Exchange tokens
    ("OKB", 45.0),
    ("CRO", 0.09),
    ("KCS", 7.50),
    // Payments, privacy and meme
    ("XRP", 0.55),
    ("LTC", 85.0),
    ("DOGE", 0.08),
    ("SHIB", 0.000009),
    ("XLM", 0.12),
    ("ATOM", 10.50),
    ("ETC", 18.0),
    ("XMR", 155.0),
    ("PEPE", 0.0000015),
    ("FLOKI", 0.00003),
];

type SeedCoin = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static [&'static str],
    &'static str,
);

const SEED_COINS: &[SeedCoin] = &[
    (
        "BTC",
        "Bitcoin",
        "Layer 1",
        "The original decentralised cryptocurrency.",
        &["pow", "store-of-value"],
        "https://bitcoin.org",
    ),
    (
        "ETH",
        "Ethereum",
        "Layer 1",
        "Programmable blockchain with smart contracts.",
        &["smart-contracts", "pos"],
        "https://ethereum.org",
    ),
    (
        "SOL",
        "Solana",
        "Layer 1",
        "High-throughput blockchain using Proof of History.",
        &["pos", "high-throughput"],
        "https://solana.com",
    ),
    (
        "BNB",
        "BNB",
        "Layer 1",
        "Native token of the BNB Chain ecosystem.",
        &["exchange-token", "bsc"],
        "https://bnbchain.org",
    ),
    (
        "USDT",
        "Tether",
        "Stablecoin",
        "USD-pegged stablecoin issued by Tether.",
        &["stablecoin", "usd-pegged"],
        "https://tether.to",
    ),
    (
        "USDC",
        "USD Coin",
        "Stablecoin",
        "Regulated USD-pegged stablecoin by Circle.",
        &["stablecoin", "regulated"],
        "https://circle.com/usdc",
    ),
    (
        "LINK",
        "Chainlink",
        "DeFi",
        "Decentralised oracle network for smart contracts.",
        &["oracle", "defi"],
        "https://chain.link",
    ),
    (
        "UNI",
        "Uniswap",
        "DeFi",
        "Governance token of the Uniswap DEX protocol.",
        &["dex", "amm", "defi"],
        "https://uniswap.org",
    ),
    (
        "DOGE",
        "Dogecoin",
        "Meme",
        "The original meme coin, based on the Shiba Inu meme.",
        &["meme", "pow"],
        "https://dogecoin.com",
    ),
    (
        "ARB",
        "Arbitrum",
        "Layer 2",
        "Optimistic rollup scaling solution for Ethereum.",
        &["l2", "rollup"],
        "https://arbitrum.io",
    ),
    (
        "OP",
        "Optimism",
        "Layer 2",
        "Optimistic rollup L2 built on Ethereum.",
        &["l2", "rollup"],
        "https://optimism.io",
    ),
    (
        "AAVE",
        "Aave",
        "DeFi",
        "Decentralised lending and borrowing protocol.",
        &["lending", "defi"],
        "https://aave.com",
    ),
];
