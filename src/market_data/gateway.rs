//! Per-operation fetch-and-normalise routines over the exchange API.
//!
//! Every read operation has a documented fallback: upstream failures
//! (network, timeout, bad body) are logged and folded into a well-defined
//! degraded value, carried on the `Err` arm of an [`Outcome`] so callers and
//! tests can tell a live answer from a fallback. Only two conditions escape
//! as hard [`BridgeError`]s: an unknown ticker, and a failed listing scan
//! (which is what ticker resolution depends on).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use itertools::Itertools;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::adapters::cse_types::{
    chart, financials, listing, movers, non_compliance, order_book, sectors, snapshot, status,
    summary, trades,
};
use super::adapters::{Endpoint, Form, Upstream};
use super::cache::ResponseCache;
use super::cdn::fix_cdn_path;
use super::depth::{pressure_index, split_sides, spread_percentage};
use super::directory::SymbolDirectory;
use super::normaliser::{number_field, records, text_field};
use super::types::*;
use crate::error::{BridgeError, Result, UpstreamError};

/// Cache keys, one per cacheable operation.
pub const ALL_STOCKS: &str = "all_stocks";
pub const ALL_SECTORS: &str = "all_sectors";
pub const MARKET_SUMMARY: &str = "market_summary";

pub const DEFAULT_MOVERS_LIMIT: usize = 10;

/// Degraded value served in place of a live one, plus what went wrong.
#[derive(Debug)]
pub struct Fallback<T> {
    pub value: T,
    pub cause: UpstreamError,
}

/// `Ok` is live data, `Err` is the operation's fallback.
pub type Outcome<T> = std::result::Result<T, Fallback<T>>;

type Fetched<T> = std::result::Result<T, UpstreamError>;

/// Collapse an [`Outcome`] to whichever value it carries.
pub trait Settle<T> {
    fn settle(self) -> T;
}

impl<T> Settle<T> for Outcome<T> {
    fn settle(self) -> T {
        match self {
            Ok(value) => value,
            Err(fallback) => fallback.value,
        }
    }
}

fn degrade<T>(operation: &'static str, symbol: Option<&str>, value: T, cause: UpstreamError) -> Fallback<T> {
    warn!(operation, symbol = symbol.unwrap_or("-"), error = %cause, "upstream unavailable, serving fallback");
    Fallback { value, cause }
}

fn expect_records<'a>(body: &'a Value, endpoint: Endpoint, envelopes: &[&str]) -> Fetched<&'a [Value]> {
    records(body, envelopes).ok_or_else(|| UpstreamError::Shape {
        endpoint: endpoint.path(),
        reason: "expected a list of records".into(),
    })
}

fn expect_object(body: &Value, endpoint: Endpoint) -> Fetched<()> {
    if body.is_object() {
        Ok(())
    } else {
        Err(UpstreamError::Shape { endpoint: endpoint.path(), reason: "expected an object".into() })
    }
}

fn stock_record(raw: &Value) -> Option<StockRecord> {
    let symbol = text_field(raw, listing::SYMBOL)?;
    Some(StockRecord {
        id: text_field(raw, listing::ID).unwrap_or_default(),
        price: number_field(raw, listing::PRICE),
        name: text_field(raw, listing::NAME).unwrap_or_else(|| symbol.clone()),
        change: number_field(raw, listing::CHANGE),
        change_percent: number_field(raw, listing::CHANGE_PERCENT),
        turnover: number_field(raw, listing::TURNOVER),
        volume: number_field(raw, listing::VOLUME),
        symbol,
    })
}

fn mover(raw: &Value) -> Option<Mover> {
    let symbol = text_field(raw, movers::SYMBOL)?;
    Some(Mover {
        id: text_field(raw, movers::ID).unwrap_or_default(),
        price: number_field(raw, movers::PRICE),
        name: text_field(raw, movers::NAME).unwrap_or_else(|| symbol.clone()),
        change: number_field(raw, movers::CHANGE),
        change_percent: number_field(raw, movers::CHANGE_PERCENT),
        volume: number_field(raw, movers::VOLUME),
        symbol,
    })
}

/// Market data gateway. Owns the response cache and the symbol directory;
/// share it behind an `Arc`.
pub struct Gateway {
    upstream: Arc<dyn Upstream>,
    cache: ResponseCache,
    directory: SymbolDirectory,
    cdn_base: Url,
    warmed: AtomicBool,
}

impl Gateway {
    pub fn new(upstream: Arc<dyn Upstream>, cache: ResponseCache, cdn_base: Url) -> Self {
        Self {
            upstream,
            cache,
            directory: SymbolDirectory::new(),
            cdn_base,
            warmed: AtomicBool::new(false),
        }
    }

    pub fn directory(&self) -> &SymbolDirectory {
        &self.directory
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    // ---- listing & symbol directory ----

    /// Full market listing, served from cache while fresh.
    pub async fn all_stocks(&self) -> Result<Vec<StockRecord>> {
        if let Some(hit) = self.cache.get(ALL_STOCKS) {
            return Ok(hit);
        }
        self.refresh_all().await
    }

    /// Rescan the full listing regardless of the cache. This is the only
    /// writer of the symbol directory.
    pub async fn refresh_all(&self) -> Result<Vec<StockRecord>> {
        let body = self
            .upstream
            .post(Endpoint::TradeSummary, &[])
            .await
            .map_err(|e| {
                warn!(error = %e, "market scan failed");
                BridgeError::Upstream(e)
            })?;

        let stocks: Vec<StockRecord> = records(&body, listing::ENVELOPE)
            .unwrap_or_default()
            .iter()
            .filter_map(stock_record)
            .collect();

        self.directory.record_all(
            stocks
                .iter()
                .filter(|s| !s.id.is_empty())
                .map(|s| (s.symbol.as_str(), s.id.as_str())),
        );
        self.cache.set(ALL_STOCKS, &stocks);
        info!(stocks = stocks.len(), symbols = self.directory.len(), "market listing scanned");
        Ok(stocks)
    }

    /// Eagerly populate the directory. Idempotent once it has succeeded; a
    /// failure leaves population to the first lazy miss.
    pub async fn warm_up(&self) -> Result<usize> {
        if self.warmed.load(Ordering::Acquire) {
            return Ok(self.directory.len());
        }
        self.refresh_all().await?;
        self.warmed.store(true, Ordering::Release);
        let symbols = self.directory.len();
        info!(symbols, "symbol directory initialised");
        Ok(symbols)
    }

    /// Ticker -> internal id. A miss triggers exactly one rescan; a second
    /// miss is final for this call.
    pub async fn resolve(&self, ticker: &str) -> Result<String> {
        if let Some(id) = self.directory.lookup(ticker) {
            return Ok(id);
        }
        debug!(ticker, "symbol not in directory, rescanning listing");
        self.refresh_all().await?;
        self.directory
            .lookup(ticker)
            .ok_or_else(|| BridgeError::SymbolNotFound(ticker.to_string()))
    }

    // ---- market-wide reads ----

    pub async fn sectors(&self) -> Outcome<Vec<Sector>> {
        if let Some(hit) = self.cache.get(ALL_SECTORS) {
            return Ok(hit);
        }
        match self.fetch_sectors().await {
            Ok(sectors) => {
                self.cache.set(ALL_SECTORS, &sectors);
                Ok(sectors)
            }
            Err(e) => Err(degrade("sectors", None, Vec::new(), e)),
        }
    }

    async fn fetch_sectors(&self) -> Fetched<Vec<Sector>> {
        let body = self.upstream.post(Endpoint::AllSectors, &[]).await?;
        let rows = expect_records(&body, Endpoint::AllSectors, sectors::ENVELOPE)?;
        Ok(rows
            .iter()
            .map(|r| Sector {
                name: text_field(r, sectors::NAME).unwrap_or_default(),
                change: number_field(r, sectors::CHANGE),
                turnover: number_field(r, sectors::TURNOVER),
            })
            .collect())
    }

    pub async fn market_status(&self) -> Outcome<MarketStatus> {
        self.fetch_market_status()
            .await
            .map_err(|e| degrade("market_status", None, MarketStatus::unknown(), e))
    }

    async fn fetch_market_status(&self) -> Fetched<MarketStatus> {
        let body = self.upstream.post(Endpoint::MarketStatus, &[]).await?;
        expect_object(&body, Endpoint::MarketStatus)?;
        Ok(MarketStatus {
            status: text_field(&body, status::STATUS).unwrap_or_else(|| "Unknown".into()),
            timestamp: Utc::now(),
        })
    }

    pub async fn market_summary(&self) -> Outcome<MarketSummary> {
        if let Some(hit) = self.cache.get(MARKET_SUMMARY) {
            return Ok(hit);
        }
        match self.fetch_market_summary().await {
            Ok(summary) => {
                self.cache.set(MARKET_SUMMARY, &summary);
                Ok(summary)
            }
            Err(e) => Err(degrade("market_summary", None, MarketSummary::unavailable(), e)),
        }
    }

    async fn fetch_market_summary(&self) -> Fetched<MarketSummary> {
        let body = self.upstream.post(Endpoint::DailyMarketSummary, &[]).await?;
        expect_object(&body, Endpoint::DailyMarketSummary)?;
        Ok(MarketSummary {
            market_pe: number_field(&body, summary::MARKET_PE),
            market_pb: number_field(&body, summary::MARKET_PB),
            net_foreign_flow: number_field(&body, summary::NET_FOREIGN_FLOW),
            total_turnover: number_field(&body, summary::TOTAL_TURNOVER),
            total_volume: number_field(&body, summary::TOTAL_VOLUME),
            timestamp: Utc::now(),
            status: None,
        })
    }

    /// Upstream ordering is trusted as-is; only truncated.
    pub async fn top_gainers(&self, limit: usize) -> Outcome<Vec<Mover>> {
        self.movers(Endpoint::TopGainers, limit).await
    }

    pub async fn top_losers(&self, limit: usize) -> Outcome<Vec<Mover>> {
        self.movers(Endpoint::TopLosers, limit).await
    }

    async fn movers(&self, endpoint: Endpoint, limit: usize) -> Outcome<Vec<Mover>> {
        self.fetch_movers(endpoint, limit)
            .await
            .map_err(|e| degrade(endpoint.path(), None, Vec::new(), e))
    }

    async fn fetch_movers(&self, endpoint: Endpoint, limit: usize) -> Fetched<Vec<Mover>> {
        let body = self.upstream.post(endpoint, &[]).await?;
        let rows = expect_records(&body, endpoint, &[])?;
        Ok(rows.iter().take(limit).filter_map(mover).collect())
    }

    pub async fn non_compliance(&self) -> Outcome<Vec<String>> {
        self.fetch_non_compliance()
            .await
            .map_err(|e| degrade("non_compliance", None, Vec::new(), e))
    }

    async fn fetch_non_compliance(&self) -> Fetched<Vec<String>> {
        let body = self.upstream.post(Endpoint::NonComplianceAnnouncements, &[]).await?;
        Ok(records(&body, non_compliance::ENVELOPE)
            .unwrap_or_default()
            .iter()
            .filter_map(|r| text_field(r, non_compliance::COMPANY))
            .unique()
            .collect())
    }

    // ---- per-symbol reads ----

    /// Depth with derived pressure/spread. Fails hard only on an unknown
    /// ticker; any upstream failure degrades to a closed, zeroed book.
    pub async fn order_book(&self, symbol: &str) -> Result<Outcome<OrderBookSnapshot>> {
        let stock_id = self.resolve(symbol).await?;
        Ok(self
            .fetch_order_book(symbol, stock_id)
            .await
            .map_err(|e| degrade("order_book", Some(symbol), OrderBookSnapshot::closed(symbol), e)))
    }

    async fn fetch_order_book(&self, symbol: &str, stock_id: String) -> Fetched<OrderBookSnapshot> {
        let body = self.upstream.post(Endpoint::OrderBook, &[("stockId", stock_id)]).await?;
        expect_object(&body, Endpoint::OrderBook)?;

        let totals = body.get(order_book::TOTALS).unwrap_or(&Value::Null);
        let total_bids = number_field(totals, order_book::TOTAL_BIDS);
        let total_asks = number_field(totals, order_book::TOTAL_ASKS);
        let (bids, asks) = split_sides(records(&body, order_book::ROWS).unwrap_or_default());

        Ok(OrderBookSnapshot {
            symbol: symbol.to_string(),
            total_bids,
            total_asks,
            pressure_index: pressure_index(total_bids, total_asks),
            spread_percentage: spread_percentage(&bids, &asks),
            bids,
            asks,
            status: BookStatus::Active,
        })
    }

    pub async fn stock_snapshot(&self, symbol: &str) -> Outcome<StockSnapshot> {
        self.fetch_stock_snapshot(symbol)
            .await
            .map_err(|e| degrade("stock_snapshot", Some(symbol), StockSnapshot::unavailable(symbol), e))
    }

    async fn fetch_stock_snapshot(&self, symbol: &str) -> Fetched<StockSnapshot> {
        let body = self
            .upstream
            .post(Endpoint::TodaySharePrice, &[("symbol", symbol.to_string())])
            .await?;
        expect_object(&body, Endpoint::TodaySharePrice)?;
        Ok(StockSnapshot {
            symbol: symbol.to_string(),
            open: number_field(&body, snapshot::OPEN),
            high: number_field(&body, snapshot::HIGH),
            low: number_field(&body, snapshot::LOW),
            last: number_field(&body, snapshot::LAST),
            volume: number_field(&body, snapshot::VOLUME),
            crossing_volume: number_field(&body, snapshot::CROSSING_VOLUME),
            change: number_field(&body, snapshot::CHANGE),
            change_percent: number_field(&body, snapshot::CHANGE_PERCENT),
            status: None,
        })
    }

    pub async fn chart_data(&self, symbol: &str, period: ChartPeriod) -> Result<Outcome<Vec<Candle>>> {
        let stock_id = self.resolve(symbol).await?;
        Ok(self
            .fetch_chart_data(stock_id, period)
            .await
            .map_err(|e| degrade("chart_data", Some(symbol), Vec::new(), e)))
    }

    async fn fetch_chart_data(&self, stock_id: String, period: ChartPeriod) -> Fetched<Vec<Candle>> {
        let form: Form = vec![("stockId", stock_id), ("period", period.code().to_string())];
        let body = self.upstream.post(Endpoint::CompanyChartData, &form).await?;
        let rows = expect_records(&body, Endpoint::CompanyChartData, chart::ENVELOPE)?;
        Ok(rows
            .iter()
            .map(|r| Candle {
                date: r.get(chart::DATE).cloned().unwrap_or(Value::Null),
                open: number_field(r, chart::OPEN),
                high: number_field(r, chart::HIGH),
                low: number_field(r, chart::LOW),
                close: number_field(r, chart::CLOSE),
                volume: number_field(r, chart::VOLUME),
            })
            .collect())
    }

    /// Tick-level trades, market-wide or for one symbol.
    pub async fn detailed_trades(&self, symbol: Option<&str>) -> Outcome<Vec<Trade>> {
        self.fetch_detailed_trades(symbol)
            .await
            .map_err(|e| degrade("detailed_trades", symbol, Vec::new(), e))
    }

    async fn fetch_detailed_trades(&self, symbol: Option<&str>) -> Fetched<Vec<Trade>> {
        let form: Form = symbol.map(|s| ("symbol", s.to_string())).into_iter().collect();
        let body = self.upstream.post(Endpoint::DetailedTrades, &form).await?;
        let rows = expect_records(&body, Endpoint::DetailedTrades, trades::ENVELOPE)?;
        Ok(rows
            .iter()
            .map(|r| Trade {
                symbol: text_field(r, trades::SYMBOL),
                price: number_field(r, trades::PRICE),
                volume: number_field(r, trades::VOLUME),
                time: r.get(trades::TIME).cloned().unwrap_or(Value::Null),
                buyer: text_field(r, trades::BUYER),
                seller: text_field(r, trades::SELLER),
            })
            .collect())
    }

    /// Company profile, passed through verbatim.
    pub async fn company_profile(&self, symbol: &str) -> Outcome<Value> {
        self.upstream
            .post(Endpoint::CompanyProfile, &[("symbol", symbol.to_string())])
            .await
            .map_err(|e| {
                let stub = json!({ "symbol": symbol, "name": symbol, "status": UNAVAILABLE });
                degrade("company_profile", Some(symbol), stub, e)
            })
    }

    /// Up to three most recent quarterly and annual filings, with repaired
    /// CDN links.
    pub async fn financial_reports(&self, symbol: &str) -> Outcome<Vec<FinancialReport>> {
        self.fetch_financial_reports(symbol)
            .await
            .map_err(|e| degrade("financial_reports", Some(symbol), Vec::new(), e))
    }

    async fn fetch_financial_reports(&self, symbol: &str) -> Fetched<Vec<FinancialReport>> {
        let body = self
            .upstream
            .post(Endpoint::Financials, &[("symbol", symbol.to_string())])
            .await?;

        let mut reports = Vec::new();
        for (key, kind) in [
            (financials::QUARTERLY, ReportKind::Quarterly),
            (financials::ANNUAL, ReportKind::Annual),
        ] {
            let rows = body.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
            reports.extend(rows.iter().take(financials::PER_KIND).map(|r| FinancialReport {
                kind,
                period: text_field(r, financials::PERIOD),
                url: r
                    .get(financials::PATH)
                    .and_then(Value::as_str)
                    .map(|p| fix_cdn_path(&self.cdn_base, p))
                    .unwrap_or_default(),
                upload_date: r.get(financials::UPLOAD_DATE).cloned().unwrap_or(Value::Null),
            }));
        }
        Ok(reports)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::market_data::adapters::scripted::ScriptedUpstream;
    use std::time::Duration;

    pub(crate) fn listing_body() -> Value {
        json!({
            "reqTradeSummery": [
                {"symbol": "JKH.N0000", "id": 101, "price": "195.50", "name": "JOHN KEELLS HOLDINGS",
                 "change": "1.25", "percentageChange": "0.64", "turnover": "1,250,000.00", "sharevolume": "6,400"},
                {"symbol": "DIAL.N0000", "id": "202", "price": 0, "lastTradedPrice": "12.40",
                 "companyName": "DIALOG AXIATA", "change": -0.1, "percentageChange": -0.8,
                 "turnover": 98000, "volume": 7900},
                {"symbol": "PENNY.N0000", "id": 303, "price": 1.0, "turnover": 1.0, "sharevolume": 0}
            ]
        })
    }

    pub(crate) fn gateway_with(upstream: Arc<ScriptedUpstream>) -> Gateway {
        let cdn = Url::parse("https://cdn.cse.lk/").expect("static url");
        Gateway::new(upstream, ResponseCache::new(Duration::from_secs(30)), cdn)
    }

    fn scripted() -> Arc<ScriptedUpstream> {
        Arc::new(ScriptedUpstream::new().with(Endpoint::TradeSummary, listing_body()))
    }

    #[tokio::test]
    async fn test_listing_normalises_aliases() {
        let gw = gateway_with(scripted());
        let stocks = gw.all_stocks().await.unwrap();
        assert_eq!(stocks.len(), 3);

        assert_eq!(stocks[0].id, "101");
        assert_eq!(stocks[0].price, 195.5);
        assert_eq!(stocks[0].turnover, 1_250_000.0);
        assert_eq!(stocks[0].volume, 6400.0);

        assert_eq!(stocks[1].price, 12.4);
        assert_eq!(stocks[1].name, "DIALOG AXIATA");
        assert_eq!(stocks[1].volume, 7900.0);
        assert_eq!(stocks[2].name, "PENNY.N0000");
    }

    #[tokio::test]
    async fn test_listing_is_cached() {
        let up = scripted();
        let gw = gateway_with(up.clone());
        gw.all_stocks().await.unwrap();
        gw.all_stocks().await.unwrap();
        assert_eq!(up.calls_to(Endpoint::TradeSummary), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_is_hard() {
        let gw = gateway_with(Arc::new(ScriptedUpstream::new()));
        assert!(matches!(gw.all_stocks().await, Err(BridgeError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_resolve_every_listed_ticker_after_scan() {
        let up = scripted();
        let gw = gateway_with(up.clone());
        gw.all_stocks().await.unwrap();

        for (ticker, id) in [("JKH.N0000", "101"), ("DIAL.N0000", "202"), ("PENNY.N0000", "303")] {
            assert_eq!(gw.resolve(ticker).await.unwrap(), id);
        }
        assert_eq!(up.calls_to(Endpoint::TradeSummary), 1);
    }

    #[tokio::test]
    async fn test_resolve_miss_rescans_once_then_fails() {
        let up = scripted();
        let gw = gateway_with(up.clone());
        gw.warm_up().await.unwrap();

        let err = gw.resolve("NOPE.N0000").await.unwrap_err();
        assert!(matches!(err, BridgeError::SymbolNotFound(ref t) if t == "NOPE.N0000"));
        assert_eq!(up.calls_to(Endpoint::TradeSummary), 2);
    }

    #[tokio::test]
    async fn test_resolve_picks_up_newly_listed_symbol() {
        let up = scripted();
        let gw = gateway_with(up.clone());
        gw.warm_up().await.unwrap();

        up.set(
            Endpoint::TradeSummary,
            json!({"reqTradeSummery": [{"symbol": "NEW.N0000", "id": 404}]}),
        );
        // rescan bypasses the still-fresh cached listing
        assert_eq!(gw.resolve("NEW.N0000").await.unwrap(), "404");
        assert_eq!(gw.resolve("JKH.N0000").await.unwrap(), "101");
    }

    #[tokio::test]
    async fn test_warm_up_is_idempotent_and_failure_is_recoverable() {
        let up = Arc::new(ScriptedUpstream::new());
        let gw = gateway_with(up.clone());
        assert!(gw.warm_up().await.is_err());
        assert!(gw.directory().is_empty());

        up.set(Endpoint::TradeSummary, listing_body());
        assert_eq!(gw.resolve("DIAL.N0000").await.unwrap(), "202");

        assert_eq!(gw.warm_up().await.unwrap(), 3);
        assert_eq!(gw.warm_up().await.unwrap(), 3);
        assert_eq!(up.calls_to(Endpoint::TradeSummary), 3);
    }

    #[tokio::test]
    async fn test_order_book_metrics() {
        let up = scripted();
        up.set(
            Endpoint::OrderBook,
            json!({
                "reqOrderBookTotal": {"totalBids": "3,000", "totalAsks": "1,000"},
                "reqOrderBook": [
                    {"type": "BID", "price": "195.00", "quantity": "1,000"},
                    {"type": "ASK", "price": "196.95", "quantity": 400},
                    {"type": "BID", "price": 194.5, "quantity": 2000}
                ]
            }),
        );
        let gw = gateway_with(up.clone());
        let book = gw.order_book("JKH.N0000").await.unwrap().unwrap();

        assert_eq!(book.status, BookStatus::Active);
        assert_eq!(book.pressure_index, 0.5);
        assert_eq!(book.spread_percentage, 1.0);
        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.asks[0], DepthLevel { price: 196.95, volume: 400.0 });
        assert_eq!(up.last_form(Endpoint::OrderBook), Some(vec![("stockId", "101".to_string())]));
    }

    #[tokio::test]
    async fn test_order_book_failure_degrades_to_closed() {
        let gw = gateway_with(scripted());
        let fallback = gw.order_book("JKH.N0000").await.unwrap().unwrap_err();
        assert_eq!(fallback.value, OrderBookSnapshot::closed("JKH.N0000"));
        assert!(matches!(fallback.cause, UpstreamError::Decode { endpoint: "orderBook", .. }));
    }

    #[tokio::test]
    async fn test_order_book_unknown_symbol_is_hard() {
        let gw = gateway_with(scripted());
        assert!(matches!(
            gw.order_book("NOPE.N0000").await,
            Err(BridgeError::SymbolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sectors_cached_and_fallback() {
        let up = Arc::new(ScriptedUpstream::new());
        let gw = gateway_with(up.clone());
        let fallback = gw.sectors().await.unwrap_err();
        assert!(fallback.value.is_empty());

        up.set(Endpoint::AllSectors, json!([{"sector": "Banks", "change": "1.5", "turnover": "10,000"}]));
        let sectors = gw.sectors().await.unwrap();
        assert_eq!(sectors, vec![Sector { name: "Banks".into(), change: 1.5, turnover: 10_000.0 }]);
        gw.sectors().await.unwrap();
        assert_eq!(up.calls_to(Endpoint::AllSectors), 2);
    }

    #[tokio::test]
    async fn test_summary_fallback_is_zeroed() {
        let gw = gateway_with(scripted());
        let summary = gw.market_summary().await.settle();
        assert_eq!(summary.market_pe, 0.0);
        assert_eq!(summary.total_volume, 0.0);
        assert_eq!(summary.status.as_deref(), Some(UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_market_status() {
        let up = Arc::new(ScriptedUpstream::new().with(Endpoint::MarketStatus, json!({"status": "Market Open"})));
        let gw = gateway_with(up);
        assert_eq!(gw.market_status().await.unwrap().status, "Market Open");

        let gw = gateway_with(scripted());
        assert_eq!(gw.market_status().await.settle().status, "Unknown");
    }

    #[tokio::test]
    async fn test_stock_snapshot_live_and_fallback() {
        let up = Arc::new(ScriptedUpstream::new().with(
            Endpoint::TodaySharePrice,
            json!({"open": "12.00", "high": 12.6, "low": "11.9", "lastTradedPrice": "12.40",
                   "volume": "1,050,000", "crossingVolume": 0, "change": "0.4", "changePercentage": "3.33"}),
        ));
        let gw = gateway_with(up.clone());
        let snap = gw.stock_snapshot("DIAL.N0000").await.unwrap();
        assert_eq!(snap.last, 12.4);
        assert_eq!(snap.volume, 1_050_000.0);
        assert_eq!(snap.change_percent, 3.33);
        assert_eq!(snap.status, None);
        assert_eq!(up.last_form(Endpoint::TodaySharePrice), Some(vec![("symbol", "DIAL.N0000".to_string())]));

        let gw = gateway_with(scripted());
        let fallback = gw.stock_snapshot("DIAL.N0000").await.unwrap_err().value;
        assert_eq!(fallback, StockSnapshot::unavailable("DIAL.N0000"));
    }

    #[tokio::test]
    async fn test_movers_truncate_in_upstream_order() {
        let rows: Vec<Value> = (0..15)
            .map(|i| json!({"symbol": format!("S{i}.N0000"), "id": i, "price": "10", "changePercentage": 15 - i}))
            .collect();
        let up = Arc::new(ScriptedUpstream::new().with(Endpoint::TopGainers, Value::Array(rows)));
        let gw = gateway_with(up);

        let gainers = gw.top_gainers(DEFAULT_MOVERS_LIMIT).await.unwrap();
        assert_eq!(gainers.len(), 10);
        assert_eq!(gainers[0].symbol, "S0.N0000");
        assert_eq!(gainers[9].change_percent, 6.0);

        assert!(gw.top_losers(5).await.unwrap_err().value.is_empty());
    }

    #[tokio::test]
    async fn test_chart_data_envelope_and_period() {
        let up = scripted();
        up.set(
            Endpoint::CompanyChartData,
            json!({"reqCompanyChartData": [{"date": 1718000000000u64, "open": "1", "high": "2", "low": "0.5", "close": "1.5", "volume": "1,000"}]}),
        );
        let gw = gateway_with(up.clone());
        let candles = gw.chart_data("DIAL.N0000", ChartPeriod::Weekly).await.unwrap().unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].volume, 1000.0);
        assert_eq!(candles[0].date, json!(1718000000000u64));
        assert_eq!(
            up.last_form(Endpoint::CompanyChartData),
            Some(vec![("stockId", "202".to_string()), ("period", "2".to_string())])
        );
    }

    #[tokio::test]
    async fn test_detailed_trades_optional_symbol() {
        let up = Arc::new(ScriptedUpstream::new().with(
            Endpoint::DetailedTrades,
            json!([{"symbol": "JKH.N0000", "price": "195.00", "volume": 100, "time": "10:31:02", "buyer": "B1"}]),
        ));
        let gw = gateway_with(up.clone());

        let trades = gw.detailed_trades(None).await.unwrap();
        assert_eq!(trades[0].price, 195.0);
        assert_eq!(trades[0].seller, None);
        assert_eq!(up.last_form(Endpoint::DetailedTrades), Some(vec![]));

        gw.detailed_trades(Some("JKH.N0000")).await.unwrap();
        assert_eq!(
            up.last_form(Endpoint::DetailedTrades),
            Some(vec![("symbol", "JKH.N0000".to_string())])
        );
    }

    #[tokio::test]
    async fn test_financial_reports_top_three_with_cdn_urls() {
        let quarterly: Vec<Value> = (1..=4)
            .map(|q| json!({"fileText": format!("Q{q} 2024"), "path": format!("cmt/cmt/upload_report_file/q{q} report.pdf"), "uploadDate": 1700000000000u64}))
            .collect();
        let up = Arc::new(ScriptedUpstream::new().with(
            Endpoint::Financials,
            json!({
                "infoQuarterlyData": quarterly,
                "infoAnnualData": [{"fileText": "Annual Report 2023", "path": "/upload_report_file/ar.pdf", "uploadDate": "2024-05-30"}]
            }),
        ));
        let gw = gateway_with(up);
        let reports = gw.financial_reports("JKH.N0000").await.unwrap();

        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].kind, ReportKind::Quarterly);
        assert_eq!(reports[0].url, "https://cdn.cse.lk/cmt/upload_report_file/q1%20report.pdf");
        assert_eq!(reports[2].period.as_deref(), Some("Q3 2024"));
        assert_eq!(reports[3].kind, ReportKind::Annual);
        assert_eq!(reports[3].url, "https://cdn.cse.lk/cmt/upload_report_file/ar.pdf");
    }

    #[tokio::test]
    async fn test_profile_passthrough_and_stub() {
        let up = Arc::new(ScriptedUpstream::new().with(Endpoint::CompanyProfile, json!({"reqComSumery": {"name": "X"}})));
        let gw = gateway_with(up);
        assert_eq!(gw.company_profile("X.N0000").await.unwrap(), json!({"reqComSumery": {"name": "X"}}));

        let gw = gateway_with(scripted());
        let stub = gw.company_profile("X.N0000").await.unwrap_err().value;
        assert_eq!(stub, json!({"symbol": "X.N0000", "name": "X.N0000", "status": "Unavailable"}));
    }

    #[tokio::test]
    async fn test_non_compliance_deduplicates() {
        let up = Arc::new(ScriptedUpstream::new().with(
            Endpoint::NonComplianceAnnouncements,
            json!({"nonComplianceAnnouncements": [
                {"company": "ABC.N0000"}, {"company": "XYZ.N0000"}, {"company": "ABC.N0000"}, {"company": ""}
            ]}),
        ));
        let gw = gateway_with(up);
        let mut companies = gw.non_compliance().await.unwrap();
        companies.sort();
        assert_eq!(companies, vec!["ABC.N0000", "XYZ.N0000"]);
    }

    #[test]
    fn test_settle() {
        let live: Outcome<u8> = Ok(1);
        let degraded: Outcome<u8> = Err(Fallback {
            value: 0,
            cause: UpstreamError::Shape { endpoint: "x", reason: "y".into() },
        });
        assert_eq!(live.settle(), 1);
        assert_eq!(degraded.settle(), 0);
    }
}
