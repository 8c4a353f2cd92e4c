//! Data models for telemetry records and pricing.

mod pricing;
mod record;

#[allow(unused_imports)]
pub use pricing::{ModelPricing, PriceSpec};

#[allow(unused_imports)]
pub use record::{
    attributes,
    event_name,
    event_timestamp,
    model,
    token_count,
    LogRecord,
    API_REQUEST_EVENT,
    API_RESPONSE_EVENT,
    UNKNOWN_MODEL,
};
