//! Stats command - daily token usage and cost report.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::aggregation::{
    overall_totals, process_log_file, totals_by_date, totals_by_model, DailyUsage, UsageStats,
    UNDATED,
};
use crate::archive::archive_file;
use crate::config::{resolve_log_path, JSONL_FILE};
use crate::convert::convert_log_file;
use crate::data::read_last_timestamp;
use crate::pricing::{get_price_spec, PriceSource};
use crate::simplify::SimplifyLevel;


/// Run the stats command.
pub fn run(path: PathBuf, timezone: Option<String>, archive: bool, level: u8) -> Result<()> {
    let level = SimplifyLevel::try_from(level)?;
    let timezone = match timezone {
        Some(name) => {
            Some(Tz::from_str(&name).map_err(|_| anyhow!("unknown timezone: {name}"))?)
        }
        None => None,
    };

    let resolved = resolve_log_path(&path)?;
    let jsonl_path = if resolved.extension().and_then(|e| e.to_str()) == Some("log") {
        convert_raw_log(&resolved, archive, level)?
    } else {
        resolved
    };

    println!("Reading {}...", jsonl_path.display());
    let prices = get_price_spec(&PriceSource::from_env()).context("failed to load price data")?;
    let (usage, count, had_errors) = process_log_file(&jsonl_path, &prices, timezone)?;

    if count == 0 {
        println!("No inference events found in the log.");
    } else {
        println!("\nFound {count} inference events.");
        render_report(&usage);
    }

    if had_errors {
        return Err(anyhow!(
            "errors encountered while reading the log; results above may be incomplete"
        ));
    }
    Ok(())
}


/// Bring the canonical JSONL up to date from a raw log, then return the
/// JSONL path to aggregate.
fn convert_raw_log(raw: &std::path::Path, archive: bool, level: SimplifyLevel) -> Result<PathBuf> {
    let output = raw.with_file_name(JSONL_FILE);

    let last_timestamp = if output.is_file() {
        read_last_timestamp(&output)
            .with_context(|| format!("failed to scan the tail of {}", output.display()))?
    } else {
        None
    };

    let outcome = convert_log_file(raw, &output, last_timestamp.as_deref(), level)?;
    println!(
        "Converted {} new records from {} ({} skipped)",
        outcome.written,
        raw.display(),
        outcome.skipped
    );

    if archive {
        let target = archive_file(raw, &std::env::temp_dir())?;
        println!("Archived {} to {}", raw.display(), target.display());
    }

    Ok(output)
}


/// Render the per-day, per-model usage tables.
fn render_report(usage: &DailyUsage) {
    let header = row(
        "Date",
        "Model",
        "Requests",
        "Input",
        "Output",
        "Cached",
        "Thoughts",
        "Total",
        "Cost",
    );
    let width = header.len();

    println!("\n{}", "=".repeat(width));
    println!("{:^width$}", "Gemini CLI Usage Statistics");
    println!("{}", "=".repeat(width));
    println!("{header}");
    println!("{}", "-".repeat(width));

    let day_costs = totals_by_date(usage);
    let mut previous: Option<NaiveDate> = None;
    for ((date, model), stats) in usage {
        if let Some(prev) = previous {
            if prev != *date {
                print_day_total(prev, day_costs[&prev], width);
            }
        }
        previous = Some(*date);
        println!("{}", stats_row(format_date(*date), model, stats));
    }
    if let Some(prev) = previous {
        print_day_total(prev, day_costs[&prev], width);
    }

    println!("\nUSAGE BY MODEL");
    println!("{}", "-".repeat(width));
    for (model, stats) in totals_by_model(usage) {
        println!("{}", stats_row(String::new(), &model, &stats));
    }

    println!("{}", "-".repeat(width));
    let total = overall_totals(usage);
    println!("{}", stats_row(String::new(), "Grand Total", &total));
}


fn row(
    date: &str,
    model: &str,
    requests: &str,
    input: &str,
    output: &str,
    cached: &str,
    thoughts: &str,
    total: &str,
    cost: &str,
) -> String {
    format!(
        "{date:<10} | {model:<30} | {requests:>8} | {input:>13} | {output:>13} | {cached:>13} | {thoughts:>13} | {total:>13} | {cost:>10}"
    )
}


fn stats_row(date: String, model: &str, stats: &UsageStats) -> String {
    row(
        &date,
        model,
        &format_number(stats.count),
        &format_number(stats.input_tokens),
        &format_number(stats.output_tokens),
        &format_number(stats.cached_tokens),
        &format_number(stats.thoughts_tokens),
        &format_number(stats.total_tokens()),
        &format!("${:.4}", stats.cost),
    )
}


fn print_day_total(date: NaiveDate, cost: f64, width: usize) {
    let middle = width.saturating_sub(26);
    println!(
        "{:<10} | {:<middle$} | {:>10}",
        format_date(date),
        "Day total",
        format!("${cost:.4}")
    );
    println!("{}", "-".repeat(width));
}


/// Dates print as YYYY-MM-DD; the sentinel bucket for events without a
/// usable timestamp prints as "undated".
fn format_date(date: NaiveDate) -> String {
    if date == UNDATED {
        "undated".to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}


/// Format a number with commas.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}
