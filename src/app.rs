//! Application orchestrator.
//! Loads/merges config, initializes logging, installs signal handlers,
//! validates the namespace roots, resolves the partition-day range, diffs
//! each day, and hands the aggregated pending set to the transfer layer.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use partition_move::config::{self, Config, validate_roots};
use partition_move::errors::MoverError;
use partition_move::output as out;
use partition_move::partition::{ExcludeFilter, MirrorPair, diff, range};
use partition_move::storage::LocalStorage;
use partition_move::transfer;
use partition_move::{CheckpointStore, shutdown};

use crate::cli::Args;
use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        if let Ok(cfg_env) = std::env::var(config::xml::CONFIG_ENV_VAR) {
            out::print_info(&format!(
                "Using {} (explicit):\n  {}\n",
                config::xml::CONFIG_ENV_VAR,
                cfg_env
            ));
            out::print_info("To override, unset the variable or point it at another file.");
            return Ok(());
        }
        match config::default_config_path() {
            Some(p) => {
                out::print_info(&format!(
                    "Default partition_move config path:\n  {}\n",
                    p.display()
                ));
                if p.exists() {
                    out::print_info("A config file exists at that location.");
                } else {
                    out::print_info(
                        "No config file exists there; built-in defaults apply until one is created.",
                    );
                }
            }
            None => {
                out::print_error("Could not determine a default config path on this system.");
            }
        }
        return Ok(());
    }

    // Build config from XML (if present), then apply CLI overrides (CLI wins).
    let mut cfg = config::load_config()?;
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt: Option<tracing_appender::non_blocking::WorkerGuard> =
        init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
            out::print_error(&format!("Failed to initialize logging: {}", e));
            e
        })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; shutting down gracefully...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .expect("failed to install signal handler");
    }

    if shutdown::is_requested() {
        return Ok(());
    }

    debug!(
        workers = cfg.workers,
        log_level = %cfg.log_level,
        dry_run = cfg.dry_run,
        checkpoint = %cfg.checkpoint_file.display(),
        "Starting partition_move"
    );

    let result = run_pipeline(&args, &cfg);

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn run_pipeline(args: &Args, cfg: &Config) -> Result<()> {
    let source_root = args
        .source_root
        .clone()
        .ok_or_else(|| MoverError::InvalidArgument("missing SOURCE_ROOT".into()))?;
    let dest_root = args
        .dest_root
        .clone()
        .ok_or_else(|| MoverError::InvalidArgument("missing DEST_ROOT".into()))?;

    validate_roots(&source_root, &dest_root, cfg.dry_run)?;

    // Both clients are shared across workers for the whole run; a failure
    // to bind either namespace is fatal at startup.
    let pair = Arc::new(MirrorPair::new(
        Arc::new(LocalStorage::connect(&source_root)?),
        Arc::new(LocalStorage::connect(&dest_root)?),
    ));
    let store = CheckpointStore::new(&cfg.checkpoint_file);

    let days = range::resolve_days(args.start_day.as_deref(), &store)?;
    if days.is_empty() {
        out::print_info("No partition days to process.");
        pair.close();
        return Ok(());
    }

    // Self-heal: clear temp debris from crashed prior runs before diffing,
    // so half-copied artifacts are neither mirrored nor counted.
    if !cfg.dry_run {
        transfer::sweep_orphan_temps(&pair, &days);
    }

    let filter = ExcludeFilter {
        names: cfg.exclude_names.clone(),
        parents: cfg.exclude_parents.clone(),
    };

    let mut pending = Vec::new();
    for day in &days {
        match diff::pending_for_day(&pair, *day, &filter, !cfg.dry_run) {
            Ok(mut files) => pending.append(&mut files),
            Err(MoverError::PartitionSkipped(d)) => {
                info!(day = %d, "Source partition absent; skipping day");
            }
            Err(e) => {
                // Day-level trouble never aborts the run; the day is simply
                // re-offered on the next run since the checkpoint derives
                // from pending entries only.
                warn!(day = %day, error = %e, "Partition diff failed; skipping day");
            }
        }
    }

    if cfg.dry_run {
        for p in &pending {
            let dest = pair.to_dest(&p.source_path)?;
            out::print_user(&format!(
                "would move '{}' -> '{}'",
                p.source_path.display(),
                dest.display()
            ));
        }
        out::print_info(&format!(
            "Dry-run: {} file(s) across {} day(s) would be transferred; nothing was modified.",
            pending.len(),
            days.len()
        ));
        pair.close();
        return Ok(());
    }

    let report = transfer::transfer_all(Arc::clone(&pair), pending, cfg.workers, &store);
    out::print_user(&format!(
        "Transferred {}/{} file(s), {} failed, in {:.2?}.",
        report.succeeded, report.attempted, report.failed, report.elapsed
    ));
    if report.failed > 0 {
        out::print_warn(
            "Some transfers failed; the checkpoint still advanced, so failed files will not be retried automatically.",
        );
    } else if report.attempted > 0 {
        out::print_success("All pending files transferred.");
    }
    Ok(())
}
