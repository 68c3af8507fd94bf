// Field-aliasing tables for the exchange's JSON bodies.
//
// Upstream field names are inconsistent across endpoints (and misspelled in
// places), so every canonical field lists the raw keys it may come from, in
// priority order. The normaliser takes the first one that is present.

/// Listing (`tradeSummary`).
pub mod listing {
    pub const ENVELOPE: &[&str] = &["reqTradeSummery", "reqTradeSummary"];
    pub const SYMBOL: &[&str] = &["symbol"];
    pub const ID: &[&str] = &["id"];
    pub const PRICE: &[&str] = &["price", "lastTradedPrice"];
    pub const NAME: &[&str] = &["name", "companyName"];
    pub const CHANGE: &[&str] = &["change"];
    pub const CHANGE_PERCENT: &[&str] = &["percentageChange", "changePercentage"];
    pub const TURNOVER: &[&str] = &["turnover"];
    pub const VOLUME: &[&str] = &["sharevolume", "volume"];
}

/// `allSectors`
pub mod sectors {
    pub const ENVELOPE: &[&str] = &[];
    pub const NAME: &[&str] = &["sector", "name"];
    pub const CHANGE: &[&str] = &["change"];
    pub const TURNOVER: &[&str] = &["turnover"];
}

/// `marketStatus`
pub mod status {
    pub const STATUS: &[&str] = &["status"];
}

/// `dailyMarketSummery`
pub mod summary {
    pub const MARKET_PE: &[&str] = &["marketPE"];
    pub const MARKET_PB: &[&str] = &["marketPB"];
    pub const NET_FOREIGN_FLOW: &[&str] = &["netForeignFlow"];
    pub const TOTAL_TURNOVER: &[&str] = &["totalTurnover"];
    pub const TOTAL_VOLUME: &[&str] = &["totalVolume"];
}

/// `topGainers` / `topLosers`
pub mod movers {
    pub const SYMBOL: &[&str] = &["symbol"];
    pub const ID: &[&str] = &["id"];
    pub const PRICE: &[&str] = &["price", "lastTradedPrice"];
    pub const NAME: &[&str] = &["name", "companyName"];
    pub const CHANGE: &[&str] = &["change"];
    pub const CHANGE_PERCENT: &[&str] = &["changePercentage", "percentageChange"];
    pub const VOLUME: &[&str] = &["volume", "sharevolume"];
}

/// `orderBook`
pub mod order_book {
    pub const TOTALS: &str = "reqOrderBookTotal";
    pub const TOTAL_BIDS: &[&str] = &["totalBids"];
    pub const TOTAL_ASKS: &[&str] = &["totalAsks"];
    pub const ROWS: &[&str] = &["reqOrderBook"];
}

/// `todaySharePrice`
pub mod snapshot {
    pub const OPEN: &[&str] = &["open"];
    pub const HIGH: &[&str] = &["high"];
    pub const LOW: &[&str] = &["low"];
    pub const LAST: &[&str] = &["last", "lastTradedPrice"];
    pub const VOLUME: &[&str] = &["volume"];
    pub const CROSSING_VOLUME: &[&str] = &["crossingVolume"];
    pub const CHANGE: &[&str] = &["change"];
    pub const CHANGE_PERCENT: &[&str] = &["changePercent", "changePercentage"];
}

/// `companyChartDataByStock`
pub mod chart {
    pub const ENVELOPE: &[&str] = &["reqCompanyChartData"];
    pub const DATE: &str = "date";
    pub const OPEN: &[&str] = &["open"];
    pub const HIGH: &[&str] = &["high"];
    pub const LOW: &[&str] = &["low"];
    pub const CLOSE: &[&str] = &["close"];
    pub const VOLUME: &[&str] = &["volume"];
}

/// `detailedTrades`
pub mod trades {
    pub const ENVELOPE: &[&str] = &["reqDetailTrades"];
    pub const SYMBOL: &[&str] = &["symbol"];
    pub const PRICE: &[&str] = &["price"];
    pub const VOLUME: &[&str] = &["volume"];
    pub const TIME: &str = "time";
    pub const BUYER: &[&str] = &["buyer"];
    pub const SELLER: &[&str] = &["seller"];
}

/// `financials`
pub mod financials {
    pub const QUARTERLY: &str = "infoQuarterlyData";
    pub const ANNUAL: &str = "infoAnnualData";
    pub const PERIOD: &[&str] = &["fileText"];
    pub const PATH: &str = "path";
    pub const UPLOAD_DATE: &str = "uploadDate";
    /// Most recent reports kept per kind.
    pub const PER_KIND: usize = 3;
}

/// `getNonComplianceAnnouncements`
pub mod non_compliance {
    pub const ENVELOPE: &[&str] = &["nonComplianceAnnouncements"];
    pub const COMPANY: &[&str] = &["company"];
}
