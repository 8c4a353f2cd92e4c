//! Cost calculation and price-table retrieval.

mod fetch;

#[allow(unused_imports)]
pub use fetch::{get_price_spec, PriceSource, PRICE_SPEC_URL};

use serde_json::{Map, Value};

use crate::models::{self, ModelPricing, PriceSpec};


/// Input-token count above which the `_above_200k_tokens` rates apply.
const TIER_THRESHOLD_TOKENS: i64 = 200_000;


/// Compute the USD cost of a single event from its attributes.
///
/// `input_token_count` already includes `cached_content_token_count`:
/// cache reads are billed at the cache-read rate and subtracted from the
/// full-rate input, never charged twice. Thought tokens bill at the
/// output rate. When the input count exceeds 200k the tiered rates
/// replace the base rates for the whole event, a step function rather than a
/// split. No clamping is applied: malformed data where cached exceeds
/// input yields a negative input contribution that passes through.
pub fn calculate_cost(attributes: &Map<String, Value>, prices: &PriceSpec) -> f64 {
    let default = ModelPricing::default();
    let pricing = prices.get(models::model(attributes)).unwrap_or(&default);

    let input = models::token_count(attributes, "input_token_count");
    let output = models::token_count(attributes, "output_token_count");
    let cached = models::token_count(attributes, "cached_content_token_count");
    let thoughts = models::token_count(attributes, "thoughts_token_count");

    let mut input_rate = pricing.input_cost_per_token.unwrap_or(0.0);
    let mut output_rate = pricing.output_cost_per_token.unwrap_or(0.0);
    let mut cached_rate = pricing.cache_read_input_token_cost.unwrap_or(0.0);

    if input > TIER_THRESHOLD_TOKENS {
        input_rate = pricing
            .input_cost_per_token_above_200k_tokens
            .unwrap_or(input_rate);
        output_rate = pricing
            .output_cost_per_token_above_200k_tokens
            .unwrap_or(output_rate);
        cached_rate = pricing
            .cache_read_input_token_cost_above_200k_tokens
            .unwrap_or(cached_rate);
    }

    (input - cached) as f64 * input_rate
        + (output + thoughts) as f64 * output_rate
        + cached as f64 * cached_rate
}
