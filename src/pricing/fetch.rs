//! LiteLLM price-table fetch with on-disk caching.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::Value;

use crate::config::PRICE_CACHE_MAX_AGE_SECS;
use crate::error::{GoblinError, Result};
use crate::models::{ModelPricing, PriceSpec};


/// Upstream price document maintained by the LiteLLM project.
pub const PRICE_SPEC_URL: &str =
    "https://raw.githubusercontent.com/BerriAI/litellm/main/model_prices_and_context_window.json";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);


/// Where the price table is cached and how long a copy stays fresh.
///
/// Threaded into [`get_price_spec`] explicitly so tests can point it at
/// a scratch directory instead of relying on process-wide state.
#[derive(Debug, Clone)]
pub struct PriceSource {
    pub cache_path: Option<PathBuf>,
    pub max_age: Duration,
}


impl PriceSource {
    /// Cache settings from the environment: `PRICE_CACHE_PATH` wins,
    /// falling back to `~/.gemini-goblin/prices.json`. No home directory
    /// means caching is disabled.
    pub fn from_env() -> Self {
        let cache_path = std::env::var_os("PRICE_CACHE_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                dirs::home_dir().map(|home| home.join(".gemini-goblin").join("prices.json"))
            });
        Self {
            cache_path,
            max_age: Duration::from_secs(PRICE_CACHE_MAX_AGE_SECS),
        }
    }
}


/// Fetch the price table, preferring a fresh on-disk cache.
///
/// A stale cache is still used when the fetch fails; only the
/// combination of a failed fetch and no readable cache is fatal, since
/// without price data costs cannot be computed honestly.
pub fn get_price_spec(source: &PriceSource) -> Result<PriceSpec> {
    if let Some(path) = &source.cache_path {
        if cache_is_fresh(path, source.max_age) {
            if let Some(spec) = read_cache(path) {
                return Ok(spec);
            }
            // Unreadable or empty cache falls through to a fetch.
        }
    }

    let body = match fetch_body() {
        Ok(body) => body,
        Err(message) => return stale_cache_or_error(source, message),
    };

    let spec = parse_spec(&body);
    if spec.is_empty() {
        return stale_cache_or_error(
            source,
            "price document parsed but contained no model entries".to_string(),
        );
    }

    if let Some(path) = &source.cache_path {
        if let Err(e) = write_cache(path, &body) {
            eprintln!("Warning: failed to write price cache at {}: {e}", path.display());
        }
    }

    Ok(spec)
}


fn stale_cache_or_error(source: &PriceSource, message: String) -> Result<PriceSpec> {
    if let Some(path) = &source.cache_path {
        if let Some(spec) = read_cache(path) {
            eprintln!("Warning: price fetch failed ({message}); using stale cache");
            return Ok(spec);
        }
    }
    Err(GoblinError::PriceUnavailable { message })
}


fn cache_is_fresh(path: &Path, max_age: Duration) -> bool {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => SystemTime::now()
            .duration_since(modified)
            .map(|age| age < max_age)
            .unwrap_or(false),
        Err(_) => false,
    }
}


fn read_cache(path: &Path) -> Option<PriceSpec> {
    let body = fs::read_to_string(path).ok()?;
    let spec = parse_spec(&body);
    if spec.is_empty() {
        None
    } else {
        Some(spec)
    }
}


fn write_cache(path: &Path, body: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)
}


fn fetch_body() -> std::result::Result<String, String> {
    let agent = ureq::builder()
        .timeout_connect(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build();
    let response = agent
        .get(PRICE_SPEC_URL)
        .call()
        .map_err(|e| e.to_string())?;
    response.into_string().map_err(|e| e.to_string())
}


/// Parse the upstream document, skipping entries that are not pricing
/// objects (the dataset mixes a `sample_spec` entry in with the models).
fn parse_spec(body: &str) -> PriceSpec {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return HashMap::new(),
    };
    let object = match value {
        Value::Object(object) => object,
        _ => return HashMap::new(),
    };

    let mut spec = HashMap::new();
    for (name, raw) in object {
        if !raw.is_object() {
            continue;
        }
        if let Ok(pricing) = serde_json::from_value::<ModelPricing>(raw) {
            spec.insert(name, pricing);
        }
    }
    spec
}
