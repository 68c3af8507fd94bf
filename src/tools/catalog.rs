// Tool names and their JSON-schema parameter declarations.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ScanMarket,
    GetSectors,
    GetMarketStatus,
    GetMarketSummary,
    GetTopGainers,
    GetTopLosers,
    GetOrderBook,
    GetStockSnapshot,
    GetChartData,
    GetDetailedTrades,
    GetCompanyProfile,
    GetFinancialReports,
    GetNoncomplianceList,
}

impl Tool {
    pub const ALL: [Tool; 13] = [
        Tool::ScanMarket,
        Tool::GetSectors,
        Tool::GetMarketStatus,
        Tool::GetMarketSummary,
        Tool::GetTopGainers,
        Tool::GetTopLosers,
        Tool::GetOrderBook,
        Tool::GetStockSnapshot,
        Tool::GetChartData,
        Tool::GetDetailedTrades,
        Tool::GetCompanyProfile,
        Tool::GetFinancialReports,
        Tool::GetNoncomplianceList,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::ScanMarket => "scan_market",
            Tool::GetSectors => "get_sectors",
            Tool::GetMarketStatus => "get_market_status",
            Tool::GetMarketSummary => "get_market_summary",
            Tool::GetTopGainers => "get_top_gainers",
            Tool::GetTopLosers => "get_top_losers",
            Tool::GetOrderBook => "get_order_book",
            Tool::GetStockSnapshot => "get_stock_snapshot",
            Tool::GetChartData => "get_chart_data",
            Tool::GetDetailedTrades => "get_detailed_trades",
            Tool::GetCompanyProfile => "get_company_profile",
            Tool::GetFinancialReports => "get_financial_reports",
            Tool::GetNoncomplianceList => "get_noncompliance_list",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Tool::ScanMarket => "Get list of all stocks trading on CSE with current prices. Can filter by max price for penny stock scanning and minimum volume to exclude dead/illiquid stocks. Sorted by turnover, most liquid first.",
            Tool::GetSectors => "Get performance data for all market sectors including change % and turnover.",
            Tool::GetMarketStatus => "Check if market is currently open or closed.",
            Tool::GetMarketSummary => "Get daily market overview including P/E ratio, P/B ratio, foreign flow, turnover.",
            Tool::GetTopGainers => "Get list of top performing stocks (highest % increase).",
            Tool::GetTopLosers => "Get list of worst performing stocks (highest % decrease). Useful for identifying oversold opportunities or risk screening.",
            Tool::GetOrderBook => "Get market depth (bids vs asks) with pressure index (-1=bearish to +1=bullish) and spread percentage. Shows buy/sell pressure and liquidity.",
            Tool::GetStockSnapshot => "Get real-time data for a stock: open, high, low, last price, volume.",
            Tool::GetChartData => "Get historical OHLCV (candlestick) data for charting.",
            Tool::GetDetailedTrades => "Get tick-by-tick trade data. Shows every individual transaction.",
            Tool::GetCompanyProfile => "Get company information: directors, secretaries, registrars.",
            Tool::GetFinancialReports => "Get links to the latest quarterly and annual financial reports (PDFs).",
            Tool::GetNoncomplianceList => "Get list of companies on watch list or facing enforcement action.",
        }
    }

    fn input_schema(self) -> Value {
        let symbol = |example: &str| {
            json!({ "type": "string", "description": format!("Stock symbol (e.g., {example})") })
        };
        let limit = json!({
            "type": "number",
            "description": "Number of stocks to return (default: 10)",
            "default": 10
        });

        match self {
            Tool::ScanMarket => json!({
                "type": "object",
                "properties": {
                    "maxPrice": {
                        "type": "number",
                        "description": "Optional: Only return stocks priced at or below this value (in LKR)"
                    },
                    "minVolume": {
                        "type": "number",
                        "description": "Optional: Only return stocks with at least this volume (filters dead stocks)"
                    }
                }
            }),
            Tool::GetTopGainers | Tool::GetTopLosers => json!({
                "type": "object",
                "properties": { "limit": limit }
            }),
            Tool::GetOrderBook => json!({
                "type": "object",
                "properties": { "symbol": symbol("JKH.N0000") },
                "required": ["symbol"]
            }),
            Tool::GetStockSnapshot => json!({
                "type": "object",
                "properties": { "symbol": symbol("DIAL.N0000") },
                "required": ["symbol"]
            }),
            Tool::GetChartData => json!({
                "type": "object",
                "properties": {
                    "symbol": symbol("JKH.N0000"),
                    "period": {
                        "type": "string",
                        "description": "Time period: 1=Intraday, 2=Weekly, 3=Monthly, 5=Daily",
                        "enum": ["1", "2", "3", "5"],
                        "default": "5"
                    }
                },
                "required": ["symbol"]
            }),
            Tool::GetDetailedTrades => json!({
                "type": "object",
                "properties": {
                    "symbol": {
                        "type": "string",
                        "description": "Optional: Stock symbol to filter trades"
                    }
                }
            }),
            Tool::GetCompanyProfile | Tool::GetFinancialReports => json!({
                "type": "object",
                "properties": { "symbol": symbol("COMB.N0000") },
                "required": ["symbol"]
            }),
            Tool::GetSectors
            | Tool::GetMarketStatus
            | Tool::GetMarketSummary
            | Tool::GetNoncomplianceList => json!({ "type": "object", "properties": {} }),
        }
    }

    pub fn spec(self) -> ToolSpec {
        ToolSpec {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| BridgeError::UnknownTool(s.to_string()))
    }
}

/// Declaration of one callable tool as listed to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn catalog() -> Vec<ToolSpec> {
    Tool::ALL.into_iter().map(Tool::spec).collect()
}
