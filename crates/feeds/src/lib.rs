//! Price snapshots from remote market data APIs.
//!
//! ## Architecture
//!
//! - `feed` - `PriceFeed` trait consumed by the scheduler and HTTP layer
//! - `rest` - CoinGecko `coins/markets` client and row normalization
//! - `error` - feed failures and their retry classification

pub mod error;
pub mod feed;
pub mod rest;

pub use error::*;
pub use feed::*;
pub use rest::*;
