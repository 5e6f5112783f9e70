// Client module - SpaceTraders API client and request pacing
pub mod api;
pub mod throttle;
pub mod throttled_client;

pub use api::{GameApi, SpaceTradersClient};
pub use throttle::{RateThrottler, RateWindow};
pub use throttled_client::{RetryPolicy, ThrottledClient};
