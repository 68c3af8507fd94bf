//! Routes tool invocations to the gateway and wraps results in the text
//! envelope the protocol expects. This is the single recovery boundary: any
//! error raised while handling a call becomes an `isError` payload.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error};

use super::catalog::Tool;
use crate::error::{BridgeError, Result};
use crate::market_data::gateway::{Gateway, Settle, DEFAULT_MOVERS_LIMIT};
use crate::market_data::types::{ChartPeriod, StockRecord};

pub type Arguments = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<Content>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    fn success(payload: &Value) -> Self {
        let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        Self { content: vec![Content { kind: "text", text }], is_error: false }
    }

    fn failure(err: &BridgeError) -> Self {
        let text = json!({ "error": err.to_string() }).to_string();
        Self { content: vec![Content { kind: "text", text }], is_error: true }
    }
}

/// Optional filters for `scan_market`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanFilter {
    pub max_price: Option<f64>,
    pub min_volume: Option<f64>,
}

/// Drop illiquid (volume below `min_volume`, when positive) and expensive
/// (price above `max_price`) stocks, then order by turnover, most liquid first.
pub fn scan_market(stocks: Vec<StockRecord>, filter: ScanFilter) -> Vec<StockRecord> {
    let mut kept: Vec<StockRecord> = stocks
        .into_iter()
        .filter(|s| match filter.min_volume {
            Some(min) if min > 0.0 => s.volume >= min,
            _ => true,
        })
        .filter(|s| filter.max_price.map_or(true, |max| s.price <= max))
        .collect();
    kept.sort_by(|a, b| b.turnover.partial_cmp(&a.turnover).unwrap_or(Ordering::Equal));
    kept
}

fn required_symbol<'a>(tool: Tool, args: &'a Arguments) -> Result<&'a str> {
    match args.get("symbol").and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(BridgeError::MissingArgument { tool: tool.name(), argument: "symbol" }),
    }
}

fn optional_symbol(args: &Arguments) -> Option<&str> {
    args.get("symbol")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn optional_number(args: &Arguments, argument: &'static str) -> Result<Option<f64>> {
    let invalid = |v: &Value| BridgeError::InvalidArgument {
        argument,
        reason: format!("expected a number, got {v}"),
    };
    match args.get(argument) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v {
            Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| invalid(v)),
            Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| invalid(v)),
            _ => Err(invalid(v)),
        },
    }
}

/// Absent, zero or negative limits fall back to the default.
fn limit(args: &Arguments) -> Result<usize> {
    Ok(match optional_number(args, "limit")? {
        Some(n) if n >= 1.0 => n as usize,
        _ => DEFAULT_MOVERS_LIMIT,
    })
}

fn chart_period(args: &Arguments) -> Result<ChartPeriod> {
    let code = match args.get("period") {
        None | Some(Value::Null) => return Ok(ChartPeriod::default()),
        Some(Value::String(s)) if s.is_empty() => return Ok(ChartPeriod::default()),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    };
    ChartPeriod::from_code(&code).ok_or_else(|| BridgeError::InvalidArgument {
        argument: "period",
        reason: format!("'{code}' is not one of 1, 2, 3, 5"),
    })
}

pub struct ToolDispatcher {
    gateway: Arc<Gateway>,
}

impl ToolDispatcher {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Run one tool call to completion. Never fails: errors come back as an
    /// `isError` envelope.
    pub async fn call(&self, name: &str, args: &Arguments) -> ToolResult {
        match self.invoke(name, args).await {
            Ok(payload) => ToolResult::success(&payload),
            Err(e) => {
                error!(tool = name, error = %e, "tool call failed");
                ToolResult::failure(&e)
            }
        }
    }

    /// Validate arguments, run the gateway operation, return its payload.
    pub async fn invoke(&self, name: &str, args: &Arguments) -> Result<Value> {
        let tool: Tool = name.parse()?;
        debug!(%tool, "dispatching tool call");
        let gw = &self.gateway;

        let payload = match tool {
            Tool::ScanMarket => {
                let filter = ScanFilter {
                    max_price: optional_number(args, "maxPrice")?,
                    min_volume: optional_number(args, "minVolume")?,
                };
                serde_json::to_value(scan_market(gw.all_stocks().await?, filter))?
            }
            Tool::GetSectors => serde_json::to_value(gw.sectors().await.settle())?,
            Tool::GetMarketStatus => serde_json::to_value(gw.market_status().await.settle())?,
            Tool::GetMarketSummary => serde_json::to_value(gw.market_summary().await.settle())?,
            Tool::GetTopGainers => {
                serde_json::to_value(gw.top_gainers(limit(args)?).await.settle())?
            }
            Tool::GetTopLosers => serde_json::to_value(gw.top_losers(limit(args)?).await.settle())?,
            Tool::GetOrderBook => {
                let symbol = required_symbol(tool, args)?;
                serde_json::to_value(gw.order_book(symbol).await?.settle())?
            }
            Tool::GetStockSnapshot => {
                let symbol = required_symbol(tool, args)?;
                serde_json::to_value(gw.stock_snapshot(symbol).await.settle())?
            }
            Tool::GetChartData => {
                let symbol = required_symbol(tool, args)?;
                let period = chart_period(args)?;
                serde_json::to_value(gw.chart_data(symbol, period).await?.settle())?
            }
            Tool::GetDetailedTrades => {
                serde_json::to_value(gw.detailed_trades(optional_symbol(args)).await.settle())?
            }
            Tool::GetCompanyProfile => {
                let symbol = required_symbol(tool, args)?;
                gw.company_profile(symbol).await.settle()
            }
            Tool::GetFinancialReports => {
                let symbol = required_symbol(tool, args)?;
                serde_json::to_value(gw.financial_reports(symbol).await.settle())?
            }
            Tool::GetNoncomplianceList => {
                json!({ "toxic_companies": gw.non_compliance().await.settle() })
            }
        };
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::adapters::scripted::ScriptedUpstream;
    use crate::market_data::adapters::Endpoint;
    use crate::market_data::gateway::tests::{gateway_with, listing_body};

    fn stock(symbol: &str, price: f64, volume: f64, turnover: f64) -> StockRecord {
        StockRecord {
            symbol: symbol.into(),
            id: String::new(),
            price,
            name: symbol.into(),
            change: 0.0,
            change_percent: 0.0,
            turnover,
            volume,
        }
    }

    fn args(v: Value) -> Arguments {
        match v {
            Value::Object(map) => map,
            _ => Arguments::new(),
        }
    }

    fn dispatcher(up: Arc<ScriptedUpstream>) -> ToolDispatcher {
        ToolDispatcher::new(Arc::new(gateway_with(up)))
    }

    fn payload(result: &ToolResult) -> Value {
        serde_json::from_str(&result.content[0].text).unwrap()
    }

    #[test]
    fn test_scan_min_volume_drops_dead_stock() {
        let stocks = vec![stock("A", 10.0, 5.0, 50.0), stock("B", 1.0, 0.0, 1.0)];
        let out = scan_market(stocks, ScanFilter { min_volume: Some(1.0), ..Default::default() });
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol, "A");
    }

    #[test]
    fn test_scan_filters_compose_and_sort_by_turnover() {
        let stocks = vec![
            stock("LOW", 5.0, 100.0, 10.0),
            stock("DEAR", 500.0, 100.0, 9_999.0),
            stock("HIGH", 8.0, 100.0, 700.0),
            stock("DEAD", 2.0, 0.0, 0.0),
        ];
        let out = scan_market(stocks.clone(), ScanFilter::default());
        let order: Vec<&str> = out.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, vec!["DEAR", "HIGH", "LOW", "DEAD"]);

        let out = scan_market(stocks, ScanFilter { max_price: Some(10.0), min_volume: Some(1.0) });
        let order: Vec<&str> = out.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, vec!["HIGH", "LOW"]);
    }

    #[test]
    fn test_non_positive_min_volume_is_ignored() {
        let stocks = vec![stock("DEAD", 2.0, 0.0, 0.0)];
        assert_eq!(scan_market(stocks, ScanFilter { min_volume: Some(0.0), ..Default::default() }).len(), 1);
    }

    #[test]
    fn test_argument_parsing() {
        assert_eq!(limit(&args(json!({}))).unwrap(), 10);
        assert_eq!(limit(&args(json!({"limit": 0}))).unwrap(), 10);
        assert_eq!(limit(&args(json!({"limit": "3"}))).unwrap(), 3);
        assert!(limit(&args(json!({"limit": "many"}))).is_err());

        assert_eq!(chart_period(&args(json!({}))).unwrap(), ChartPeriod::Daily);
        assert_eq!(chart_period(&args(json!({"period": 1}))).unwrap(), ChartPeriod::Intraday);
        assert!(matches!(
            chart_period(&args(json!({"period": "4"}))),
            Err(BridgeError::InvalidArgument { argument: "period", .. })
        ));
    }

    #[tokio::test]
    async fn test_scan_market_end_to_end() {
        let d = dispatcher(Arc::new(ScriptedUpstream::new().with(Endpoint::TradeSummary, listing_body())));
        let result = d.call("scan_market", &args(json!({"minVolume": 1, "maxPrice": 100}))).await;
        assert!(!result.is_error);

        let rows = payload(&result);
        let symbols: Vec<&str> = rows.as_array().unwrap().iter().filter_map(|r| r["symbol"].as_str()).collect();
        assert_eq!(symbols, vec!["DIAL.N0000"]);
    }

    #[tokio::test]
    async fn test_missing_symbol_fails_before_gateway() {
        let up = Arc::new(ScriptedUpstream::new().with(Endpoint::TradeSummary, listing_body()));
        let d = dispatcher(up.clone());

        for tool in ["get_order_book", "get_stock_snapshot", "get_chart_data", "get_company_profile", "get_financial_reports"] {
            let result = d.call(tool, &args(json!({"symbol": "  "}))).await;
            assert!(result.is_error, "{tool}");
            let msg = payload(&result)["error"].as_str().unwrap().to_string();
            assert!(msg.contains("symbol"), "{msg}");
        }
        assert_eq!(up.calls_to(Endpoint::TradeSummary), 0);
        assert_eq!(up.calls_to(Endpoint::TodaySharePrice), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool_and_unknown_symbol_are_error_envelopes() {
        let d = dispatcher(Arc::new(ScriptedUpstream::new().with(Endpoint::TradeSummary, listing_body())));

        let result = d.call("buy_everything", &Arguments::new()).await;
        assert!(result.is_error);
        assert_eq!(payload(&result), json!({"error": "Unknown tool: buy_everything"}));

        let result = d.call("get_order_book", &args(json!({"symbol": "NOPE.N0000"}))).await;
        assert!(result.is_error);
        assert_eq!(payload(&result), json!({"error": "Symbol NOPE.N0000 not found on CSE"}));
    }

    #[tokio::test]
    async fn test_order_book_upstream_failure_is_not_an_error() {
        let d = dispatcher(Arc::new(ScriptedUpstream::new().with(Endpoint::TradeSummary, listing_body())));
        let result = d.call("get_order_book", &args(json!({"symbol": "JKH.N0000"}))).await;
        assert!(!result.is_error);

        let book = payload(&result);
        assert_eq!(book["status"], json!("Closed/Unavailable"));
        for field in ["totalBids", "totalAsks", "pressureIndex", "spreadPercentage"] {
            assert_eq!(book[field].as_f64(), Some(0.0), "{field}");
        }
        assert_eq!(book["bids"], json!([]));
        assert_eq!(book["asks"], json!([]));
    }

    #[tokio::test]
    async fn test_noncompliance_is_wrapped() {
        let d = dispatcher(Arc::new(ScriptedUpstream::new()));
        let result = d.call("get_noncompliance_list", &Arguments::new()).await;
        assert!(!result.is_error);
        assert_eq!(payload(&result), json!({"toxic_companies": []}));
    }

    #[test]
    fn test_envelope_serialisation() {
        let ok = serde_json::to_value(ToolResult::success(&json!([]))).unwrap();
        assert_eq!(ok, json!({"content": [{"type": "text", "text": "[]"}]}));

        let err = serde_json::to_value(ToolResult::failure(&BridgeError::UnknownTool("x".into()))).unwrap();
        assert_eq!(err["isError"], json!(true));
    }
}
