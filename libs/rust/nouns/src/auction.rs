//! Auction house arithmetic. All amounts are wei.

use crate::subgraph::models::{AuctionAmount, BidEntity};
use alloy::primitives::U256;
use serde::Serialize;
use std::fmt;

/// Bid increments offered as one-click suggestions, in percent.
pub const SUGGESTED_BID_INCREASES: [u64; 3] = [5, 10, 20];

/// Minimum bid increment over the current bid, in percent.
pub const MIN_BID_INCREMENT_PERCENT: u64 = 2;

/// Number of settled auctions averaged by [`trailing_average`].
pub const TRAILING_AUCTIONS: usize = 14;

const WEI_PER_CENT_ETH: u64 = 10_000_000_000_000_000;

/// Every tenth noun (and noun 0) goes to the founders instead of the auction.
pub fn is_nounder_noun(id: u64) -> bool {
    id % 10 == 0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AuctionState {
    Live,
    Unsettled,
    Settled,
}

pub fn auction_state(settled: bool, end_time: u64, now: u64) -> AuctionState {
    if settled {
        AuctionState::Settled
    } else if now < end_time {
        AuctionState::Live
    } else {
        AuctionState::Unsettled
    }
}

pub fn minimum_next_bid(current_bid: U256) -> U256 {
    scale_up(current_bid, 100 + MIN_BID_INCREMENT_PERCENT)
}

/// Placeholder for the bid input: the minimum bid in ether, rounded up to
/// two decimals. An auction without bids starts at 0.01.
pub fn min_bid_eth(min_bid: U256) -> String {
    if min_bid.is_zero() {
        return "0.01".to_string();
    }
    eth_rounded_up(min_bid)
}

pub fn increase_bid_by_percentage(bid: U256, percent: u64) -> String {
    eth_rounded_up(scale_up(bid, 100 + percent))
}

/// Signed change of `amount` against the floor price, e.g. `+12.50%`.
/// Returns `None` without a floor to compare against.
pub fn percent_change(amount: U256, floor: U256) -> Option<String> {
    if floor.is_zero() {
        return None;
    }

    // Ratio rounded up to four decimals, in basis points.
    let ratio = div_ceil(amount * U256::from(10_000), floor);
    let par = U256::from(10_000);

    let formatted = if ratio == par {
        "0.00%".to_string()
    } else if ratio > par {
        format!("+{}%", format_hundredths(ratio - par))
    } else {
        format!("-{}%", format_hundredths(par - ratio))
    };
    Some(formatted)
}

/// "Price vs. Floor" metric. Nounder nouns were never sold.
pub fn price_vs_floor(is_nounder: bool, amount: Option<U256>, floor: Option<U256>) -> String {
    if is_nounder {
        return "N/A".to_string();
    }
    amount
        .zip(floor)
        .and_then(|(amount, floor)| percent_change(amount, floor))
        .unwrap_or_else(|| "N/A".to_string())
}

/// "14 day avg." metric: mean of the newest settled auction amounts (newest
/// first, as returned by the subgraph), in ether rounded up to two decimals.
pub fn trailing_average(amounts: &[AuctionAmount], id: Option<u64>) -> String {
    if id == Some(0) {
        return "—".to_string();
    }

    let values: Vec<U256> = amounts
        .iter()
        .take(TRAILING_AUCTIONS)
        .filter_map(|a| U256::from_str_radix(a.amount.trim(), 10).ok())
        .collect();
    if values.is_empty() {
        return "—".to_string();
    }

    let total = values.iter().fold(U256::ZERO, |acc, v| acc + *v);
    let cents = div_ceil(
        total,
        U256::from(values.len()) * U256::from(WEI_PER_CENT_ETH),
    );
    format_hundredths(cents)
}

pub fn bid_count(bids: &[BidEntity], bidder: &str) -> usize {
    bids.iter()
        .filter(|bid| bid.bidder.id.eq_ignore_ascii_case(bidder))
        .count()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Rarity {
    OnlyMint,
    VeryLimited,
    Limited,
    VeryCommon,
    Common,
    Medium,
    Rare,
    VeryRare,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::OnlyMint => "Only Mint",
            Rarity::VeryLimited => "Very Limited",
            Rarity::Limited => "Limited",
            Rarity::VeryCommon => "Very Common",
            Rarity::Common => "Common",
            Rarity::Medium => "Medium",
            Rarity::Rare => "Rare",
            Rarity::VeryRare => "Very Rare",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rarity of a trait from the number of nouns minted with it (`total`) and
/// its share of the collection (`pct`, 0..=1).
pub fn rarity(total: Option<u64>, pct: f64) -> Rarity {
    match total {
        None | Some(1) => Rarity::OnlyMint,
        Some(t) if t <= 3 => Rarity::VeryLimited,
        Some(t) if t <= 5 => Rarity::Limited,
        _ if pct > 0.8 => Rarity::VeryCommon,
        _ if pct > 0.49 => Rarity::Common,
        _ if pct > 0.35 => Rarity::Medium,
        _ if pct > 0.25 => Rarity::Rare,
        _ if pct > 0.1 => Rarity::VeryRare,
        _ => Rarity::Limited,
    }
}

fn scale_up(amount: U256, percent: u64) -> U256 {
    div_ceil(amount * U256::from(percent), U256::from(100))
}

fn div_ceil(numerator: U256, denominator: U256) -> U256 {
    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        quotient
    } else {
        quotient + U256::from(1)
    }
}

fn eth_rounded_up(wei: U256) -> String {
    let cents = div_ceil(wei, U256::from(WEI_PER_CENT_ETH));
    format_hundredths(cents)
}

// 1234 -> "12.34"
fn format_hundredths(hundredths: U256) -> String {
    let hundred = U256::from(100);
    format!("{}.{:0>2}", hundredths / hundred, (hundredths % hundred).to_string())
}
