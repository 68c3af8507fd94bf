// Shared trait + endpoint catalogue for the exchange's HTTP interface

use serde_json::Value;

use crate::error::UpstreamError;

/// POST-only endpoints on the exchange API, by their upstream names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    TradeSummary,
    AllSectors,
    MarketStatus,
    DailyMarketSummary,
    TopGainers,
    TopLosers,
    OrderBook,
    TodaySharePrice,
    CompanyChartData,
    DetailedTrades,
    CompanyProfile,
    Financials,
    NonComplianceAnnouncements,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::TradeSummary => "tradeSummary",
            Endpoint::AllSectors => "allSectors",
            Endpoint::MarketStatus => "marketStatus",
            // sic
            Endpoint::DailyMarketSummary => "dailyMarketSummery",
            Endpoint::TopGainers => "topGainers",
            Endpoint::TopLosers => "topLosers",
            Endpoint::OrderBook => "orderBook",
            Endpoint::TodaySharePrice => "todaySharePrice",
            Endpoint::CompanyChartData => "companyChartDataByStock",
            Endpoint::DetailedTrades => "detailedTrades",
            Endpoint::CompanyProfile => "companyProfile",
            Endpoint::Financials => "financials",
            Endpoint::NonComplianceAnnouncements => "getNonComplianceAnnouncements",
        }
    }
}

/// Form fields sent as an `application/x-www-form-urlencoded` body.
pub type Form = Vec<(&'static str, String)>;

#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    /// One POST round trip, returning the decoded JSON body.
    async fn post(&self, endpoint: Endpoint, form: &[(&'static str, String)])
        -> Result<Value, UpstreamError>;
}

pub mod cse;
pub mod cse_types;

#[cfg(test)]
pub(crate) mod scripted;
