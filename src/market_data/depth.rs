// Market-depth metrics for the order book tool.

use serde_json::Value;

use super::normaliser::{number_field, round4};
use super::types::DepthLevel;

/// Levels kept per side.
pub const DEPTH_LEVELS: usize = 5;

/// Split raw depth rows into (bids, asks) by their `type` tag, keeping the
/// first `DEPTH_LEVELS` of each in upstream order (already price priority).
pub fn split_sides(rows: &[Value]) -> (Vec<DepthLevel>, Vec<DepthLevel>) {
    let side = |tag: &str| -> Vec<DepthLevel> {
        rows.iter()
            .filter(|r| {
                r.get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.eq_ignore_ascii_case(tag))
            })
            .take(DEPTH_LEVELS)
            .map(|r| DepthLevel {
                price: number_field(r, &["price"]),
                volume: number_field(r, &["quantity", "volume"]),
            })
            .collect()
    };
    (side("BID"), side("ASK"))
}

/// (bids - asks) / (bids + asks), 4 dp; 0 when there is no interest at all.
pub fn pressure_index(total_bids: f64, total_asks: f64) -> f64 {
    let total = total_bids + total_asks;
    if total > 0.0 {
        round4((total_bids - total_asks) / total)
    } else {
        0.0
    }
}

/// (best ask - best bid) / best bid * 100, 4 dp; 0 when either side is empty
/// or the best bid is zero.
pub fn spread_percentage(bids: &[DepthLevel], asks: &[DepthLevel]) -> f64 {
    match (bids.first(), asks.first()) {
        (Some(bid), Some(ask)) if bid.price > 0.0 => {
            round4((ask.price - bid.price) / bid.price * 100.0)
        }
        _ => 0.0,
    }
}
