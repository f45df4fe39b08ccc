//! Live price feed.
//!
//! Responsibilities:
//! • Fetch an immediate price over HTTP.
//! • Follow the upstream `graphql-ws` trade subscription.
//! • Handle reconnection and backoff.
//! • Republish the latest state for consumers.

pub mod client;
pub mod policy;
pub mod protocol;
pub mod source;
pub mod subscription;

pub use client::{PriceClient, PriceObserver};
pub use policy::ReconnectPolicy;
pub use source::{BitqueryHttp, PriceEndpoint, PriceSource};
pub use subscription::{FeedSnapshot, PriceFeed};
