//! Daily usage accumulation from canonical JSONL telemetry.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};
use chrono_tz::Tz;
use serde_json::Value;

use crate::data::JsonlStream;
use crate::error::Result;
use crate::models::{self, PriceSpec, API_RESPONSE_EVENT};
use crate::pricing::calculate_cost;


/// Bucket for events whose timestamp is missing or unparsable. Rendered
/// separately so bad data never blends into a real day.
pub const UNDATED: NaiveDate = NaiveDate::MIN;


/// Running totals for one (day, model) bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cached_tokens: u64,
    pub thoughts_tokens: u64,
    pub count: u64,
    pub cost: f64,
}


impl UsageStats {
    /// Field-wise merge; every field only ever grows.
    pub fn absorb(&mut self, other: &UsageStats) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cached_tokens += other.cached_tokens;
        self.thoughts_tokens += other.thoughts_tokens;
        self.count += other.count;
        self.cost += other.cost;
    }

    /// Billable total: input + output + thoughts. Cached tokens are part
    /// of the input count and would double-count here.
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens + self.thoughts_tokens
    }
}


/// Usage keyed by (calendar day, model). The BTreeMap ordering doubles
/// as the date-then-model row ordering of the report, and every report
/// view (per-day totals, per-model totals, grand total) derives from
/// this one map without another pass over the source.
pub type DailyUsage = BTreeMap<(NaiveDate, String), UsageStats>;


/// Stream `path` and accumulate `gemini_cli.api_response` events.
///
/// Returns the usage map, the number of events counted, and whether the
/// pass stopped early. Unlike conversion, aggregation fails fast: the
/// first malformed line (or an `attributes` value that is not an object)
/// ends the scan so a corrupt tail cannot silently under-report. The
/// partial totals accumulated so far are still returned, with the error
/// flag set.
pub fn process_log_file(
    path: &Path,
    prices: &PriceSpec,
    timezone: Option<Tz>,
) -> Result<(DailyUsage, u64, bool)> {
    let mut usage = DailyUsage::new();
    let mut count = 0u64;
    let mut had_errors = false;

    for item in JsonlStream::open(path)? {
        let record = match item {
            Ok(record) => record,
            Err(e) => {
                eprintln!("Warning: stopping early in {}: {e}", path.display());
                had_errors = true;
                break;
            }
        };

        let attributes = match record.get("attributes") {
            None => continue,
            Some(Value::Object(attributes)) => attributes,
            Some(_) => {
                eprintln!(
                    "Warning: stopping early in {}: attributes is not an object",
                    path.display()
                );
                had_errors = true;
                break;
            }
        };
        if models::event_name(attributes) != Some(API_RESPONSE_EVENT) {
            continue;
        }

        let date = bucket_date(models::event_timestamp(attributes), timezone);
        let model = models::model(attributes).to_string();
        let event = UsageStats {
            input_tokens: models::token_count(attributes, "input_token_count").max(0) as u64,
            output_tokens: models::token_count(attributes, "output_token_count").max(0) as u64,
            cached_tokens: models::token_count(attributes, "cached_content_token_count").max(0)
                as u64,
            thoughts_tokens: models::token_count(attributes, "thoughts_token_count").max(0)
                as u64,
            count: 1,
            cost: calculate_cost(attributes, prices),
        };

        usage.entry((date, model)).or_default().absorb(&event);
        count += 1;
    }

    Ok((usage, count, had_errors))
}


/// Calendar day for a timestamp in the requested zone, or the system
/// local zone when none is given. Absent or unparsable timestamps land in the
/// [`UNDATED`] bucket; the event still counts.
fn bucket_date(timestamp: Option<&str>, timezone: Option<Tz>) -> NaiveDate {
    let parsed = match timestamp.map(DateTime::parse_from_rfc3339) {
        Some(Ok(parsed)) => parsed,
        _ => return UNDATED,
    };
    match timezone {
        Some(tz) => parsed.with_timezone(&tz).date_naive(),
        None => parsed.with_timezone(&Local).date_naive(),
    }
}


/// Total cost per day, summed across models.
pub fn totals_by_date(usage: &DailyUsage) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for ((date, _), stats) in usage {
        *totals.entry(*date).or_insert(0.0) += stats.cost;
    }
    totals
}


/// Grand totals per model, summed across days.
pub fn totals_by_model(usage: &DailyUsage) -> BTreeMap<String, UsageStats> {
    let mut totals: BTreeMap<String, UsageStats> = BTreeMap::new();
    for ((_, model), stats) in usage {
        totals.entry(model.clone()).or_default().absorb(stats);
    }
    totals
}


/// Overall totals across every bucket.
pub fn overall_totals(usage: &DailyUsage) -> UsageStats {
    let mut total = UsageStats::default();
    for stats in usage.values() {
        total.absorb(stats);
    }
    total
}
