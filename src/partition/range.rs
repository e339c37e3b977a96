//! Day-range resolution: which partitions does this run cover.
//!
//! Start-day precedence: explicit override, else the recorded checkpoint,
//! else today. The end is always today (process-local clock). An invalid
//! override aborts the run before any work; an unreadable or unparseable
//! checkpoint falls back to today with a warning.

use tracing::{info, warn};

use crate::checkpoint::CheckpointStore;
use crate::errors::MoverError;
use crate::partition::PartitionDay;

pub fn resolve_days(
    override_day: Option<&str>,
    store: &CheckpointStore,
) -> Result<Vec<PartitionDay>, MoverError> {
    let today = PartitionDay::today();

    let start = match override_day {
        Some(raw) => raw.parse::<PartitionDay>()?,
        None => match store.read() {
            Some(marker) => match marker.parse::<PartitionDay>() {
                Ok(day) => day,
                Err(_) => {
                    warn!(
                        checkpoint = %store.path().display(),
                        marker,
                        "Checkpoint does not parse as yyyyMMdd; starting from today"
                    );
                    today
                }
            },
            None => today,
        },
    };

    let days = start.range_through(today);
    if days.is_empty() {
        warn!(start = %start, end = %today, "Start day is after today; nothing to process");
    } else {
        info!(start = %start, end = %today, days = days.len(), "Resolved partition range");
    }
    Ok(days)
}
