//! Pricing types for the LiteLLM price table.

use std::collections::HashMap;

use serde::Deserialize;


/// Per-token USD rates for one model, as published by LiteLLM.
///
/// A missing key means the rate is unknown and is treated as zero. The
/// `_above_200k_tokens` variants, when present, replace the base rates
/// for events whose input token count exceeds the 200k threshold.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ModelPricing {
    pub input_cost_per_token: Option<f64>,
    pub output_cost_per_token: Option<f64>,
    pub cache_read_input_token_cost: Option<f64>,
    pub input_cost_per_token_above_200k_tokens: Option<f64>,
    pub output_cost_per_token_above_200k_tokens: Option<f64>,
    pub cache_read_input_token_cost_above_200k_tokens: Option<f64>,
}


/// Model name → pricing record. Lookups for unlisted models fall back to
/// an all-zero `ModelPricing`.
pub type PriceSpec = HashMap<String, ModelPricing>;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ignores_unrelated_keys() {
        let pricing: ModelPricing = serde_json::from_str(
            r#"{
                "input_cost_per_token": 1e-6,
                "output_cost_per_token": 2e-6,
                "max_input_tokens": 1048576,
                "litellm_provider": "vertex_ai"
            }"#,
        )
        .unwrap();

        assert_eq!(pricing.input_cost_per_token, Some(1e-6));
        assert_eq!(pricing.output_cost_per_token, Some(2e-6));
        assert_eq!(pricing.cache_read_input_token_cost, None);
    }

    #[test]
    fn test_default_is_all_unknown() {
        let pricing = ModelPricing::default();
        assert_eq!(pricing.input_cost_per_token, None);
        assert_eq!(pricing.input_cost_per_token_above_200k_tokens, None);
    }
}
