//! Aggregation layer for usage statistics.

mod usage;

#[allow(unused_imports)]
pub use usage::{
    overall_totals,
    process_log_file,
    totals_by_date,
    totals_by_model,
    DailyUsage,
    UsageStats,
    UNDATED,
};
