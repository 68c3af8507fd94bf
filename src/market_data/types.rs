// Normalised records handed back to tool callers. Field names follow the
// camelCase the consuming agent already knows from the exchange site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the full market listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub symbol: String,
    pub id: String,
    pub price: f64,
    pub name: String,
    pub change: f64,
    pub change_percent: f64,
    pub turnover: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub name: String,
    pub change: f64,
    pub turnover: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl MarketStatus {
    pub fn unknown() -> Self {
        Self { status: "Unknown".into(), timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    #[serde(rename = "marketPE")]
    pub market_pe: f64,
    #[serde(rename = "marketPB")]
    pub market_pb: f64,
    pub net_foreign_flow: f64,
    pub total_turnover: f64,
    pub total_volume: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl MarketSummary {
    pub fn unavailable() -> Self {
        Self {
            market_pe: 0.0,
            market_pb: 0.0,
            net_foreign_flow: 0.0,
            total_turnover: 0.0,
            total_volume: 0.0,
            timestamp: Utc::now(),
            status: Some(UNAVAILABLE.into()),
        }
    }
}

pub const UNAVAILABLE: &str = "Unavailable";

/// Top gainer / loser row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub symbol: String,
    pub id: String,
    pub price: f64,
    pub name: String,
    pub change: f64,
    pub change_percent: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookStatus {
    Active,
    #[serde(rename = "Closed/Unavailable")]
    ClosedOrUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookSnapshot {
    pub symbol: String,
    pub total_bids: f64,
    pub total_asks: f64,
    /// -1 (all sellers) ..= +1 (all buyers)
    pub pressure_index: f64,
    pub spread_percentage: f64,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
    pub status: BookStatus,
}

impl OrderBookSnapshot {
    /// Zeroed book used when depth can't be fetched, so aggregate analyses
    /// can keep going with partial data.
    pub fn closed(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            total_bids: 0.0,
            total_asks: 0.0,
            pressure_index: 0.0,
            spread_percentage: 0.0,
            bids: Vec::new(),
            asks: Vec::new(),
            status: BookStatus::ClosedOrUnavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub last: f64,
    pub volume: f64,
    pub crossing_volume: f64,
    pub change: f64,
    pub change_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl StockSnapshot {
    pub fn unavailable(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            open: 0.0,
            high: 0.0,
            low: 0.0,
            last: 0.0,
            volume: 0.0,
            crossing_volume: 0.0,
            change: 0.0,
            change_percent: 0.0,
            status: Some(UNAVAILABLE.into()),
        }
    }
}

/// Chart resolution accepted by `companyChartDataByStock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartPeriod {
    Intraday,
    Weekly,
    Monthly,
    #[default]
    Daily,
}

impl ChartPeriod {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Self::Intraday),
            "2" => Some(Self::Weekly),
            "3" => Some(Self::Monthly),
            "5" => Some(Self::Daily),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Intraday => "1",
            Self::Weekly => "2",
            Self::Monthly => "3",
            Self::Daily => "5",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Passed through in whatever encoding upstream used (epoch ms or text).
    pub date: Value,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: Option<String>,
    pub price: f64,
    pub volume: f64,
    pub time: Value,
    pub buyer: Option<String>,
    pub seller: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    Quarterly,
    Annual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub period: Option<String>,
    pub url: String,
    pub upload_date: Value,
}
