//! Partition handling: calendar-day identifiers, day-range resolution,
//! leaf-file enumeration, and the per-day source/destination diff.

pub mod day;
pub mod diff;
pub mod range;
pub mod walk;

pub use day::PartitionDay;
pub use diff::{MirrorPair, PendingFile};
pub use walk::{ExcludeFilter, IN_PROGRESS_MARKER};
