//! Configuration: types, default paths, XML loading, and root validation.
//!
//! The namespace roots come from the CLI positionals; the config file only
//! supplies ambient defaults (workers, checkpoint location, logging,
//! exclusion lists). CLI flags always win over file values.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use validate::validate_roots;
pub use xml::{load_config, load_config_from_xml_path};

/// Worker-pool size used when neither config nor CLI specifies one.
pub const DEFAULT_WORKERS: usize = 5;
