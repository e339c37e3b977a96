use assert_cmd::cargo;
use chrono::{Days, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_cfg(base: &Path) -> PathBuf {
    let cfg_path = base.join("config.xml");
    let xml = format!(
        r#"<config>
  <checkpoint_file>{}</checkpoint_file>
  <log_file>{}</log_file>
  <log_level>normal</log_level>
</config>"#,
        base.join("state").join("cp.txt").display(),
        base.join("pm.log").display()
    );
    fs::write(&cfg_path, xml).unwrap();
    cfg_path
}

fn today() -> String {
    Local::now().date_naive().format("%Y%m%d").to_string()
}

fn yesterday() -> String {
    Local::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap()
        .format("%Y%m%d")
        .to_string()
}

#[test]
fn full_run_mirrors_pending_files_and_checkpoints_today() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg_path = write_cfg(&base);
    let source = base.join("src");
    let dest = base.join("dst");

    let d1 = yesterday();
    let d2 = today();

    // Yesterday: nested hour layout plus an in-progress subtree.
    let day1 = source.join(&d1);
    fs::create_dir_all(day1.join("hour=01")).unwrap();
    fs::create_dir_all(day1.join("_temporary").join("attempt_0")).unwrap();
    fs::write(day1.join("hour=01").join("a.log"), b"aaa").unwrap();
    fs::write(day1.join("hour=01").join("b.log"), b"bbb").unwrap();
    fs::write(
        day1.join("_temporary").join("attempt_0").join("part.log"),
        b"in-progress",
    )
    .unwrap();

    // Today: one file already mirrored (must be skipped, not overwritten),
    // one still pending.
    let day2 = source.join(&d2);
    fs::create_dir_all(&day2).unwrap();
    fs::write(day2.join("done.log"), b"NEW").unwrap();
    fs::write(day2.join("fresh.log"), b"fresh").unwrap();
    fs::create_dir_all(dest.join(&d2)).unwrap();
    fs::write(dest.join(&d2).join("done.log"), b"OLD").unwrap();

    let me = cargo::cargo_bin!("partition_move");
    let out = Command::new(me)
        .env("PARTITION_MOVE_CONFIG", &cfg_path)
        .current_dir(&base)
        .arg(&source)
        .arg(&dest)
        .arg("4")
        .arg(&d1)
        .output()
        .expect("spawn binary");

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    // Yesterday's leaves arrived, preserving the nested layout.
    assert_eq!(
        fs::read(dest.join(&d1).join("hour=01").join("a.log")).unwrap(),
        b"aaa"
    );
    assert_eq!(
        fs::read(dest.join(&d1).join("hour=01").join("b.log")).unwrap(),
        b"bbb"
    );
    // The in-progress subtree was not transferred.
    assert!(!dest.join(&d1).join("_temporary").exists());

    // Already-mirrored file untouched; pending file arrived.
    assert_eq!(fs::read(dest.join(&d2).join("done.log")).unwrap(), b"OLD");
    assert_eq!(
        fs::read(dest.join(&d2).join("fresh.log")).unwrap(),
        b"fresh"
    );

    // Sources are left intact (this mover copies, never deletes source data).
    assert!(day1.join("hour=01").join("a.log").exists());

    // Checkpoint advanced to the last processed day.
    let cp = fs::read_to_string(base.join("state").join("cp.txt")).unwrap();
    assert_eq!(cp.trim(), d2);

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Transferred 3/3"),
        "unexpected summary: {stdout}"
    );
}

#[test]
fn absent_day_partition_is_skipped_without_failing_the_run() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg_path = write_cfg(&base);
    let source = base.join("src");
    let dest = base.join("dst");

    // Only today's partition exists; yesterday has no directory at all.
    let d2 = today();
    fs::create_dir_all(source.join(&d2)).unwrap();
    fs::write(source.join(&d2).join("only.log"), b"x").unwrap();

    let me = cargo::cargo_bin!("partition_move");
    let out = Command::new(me)
        .env("PARTITION_MOVE_CONFIG", &cfg_path)
        .current_dir(&base)
        .arg(&source)
        .arg(&dest)
        .arg("2")
        .arg(&yesterday())
        .output()
        .expect("spawn binary");

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(fs::read(dest.join(&d2).join("only.log")).unwrap(), b"x");
    // Skipped day left no destination directory behind.
    assert!(!dest.join(yesterday()).exists());
}

#[test]
fn orphan_temp_artifacts_are_swept_before_transfer() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg_path = write_cfg(&base);
    let source = base.join("src");
    let dest = base.join("dst");

    let d = today();
    fs::create_dir_all(source.join(&d)).unwrap();
    fs::write(source.join(&d).join("a.log"), b"a").unwrap();
    fs::create_dir_all(dest.join(&d)).unwrap();
    // Debris from a crashed prior run.
    let orphan = dest.join(&d).join(".partition_move.feedface.tmp");
    fs::write(&orphan, b"partial").unwrap();

    let me = cargo::cargo_bin!("partition_move");
    let out = Command::new(me)
        .env("PARTITION_MOVE_CONFIG", &cfg_path)
        .current_dir(&base)
        .arg(&source)
        .arg(&dest)
        .output()
        .expect("spawn binary");

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(!orphan.exists(), "orphan temp should have been swept");
    assert_eq!(fs::read(dest.join(&d).join("a.log")).unwrap(), b"a");
}

#[test]
fn exclusion_flags_keep_marker_files_at_the_source() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg_path = write_cfg(&base);
    let source = base.join("src");
    let dest = base.join("dst");

    let d = today();
    fs::create_dir_all(source.join(&d)).unwrap();
    fs::write(source.join(&d).join("data.log"), b"data").unwrap();
    fs::write(source.join(&d).join("_SUCCESS"), b"").unwrap();

    let me = cargo::cargo_bin!("partition_move");
    let out = Command::new(me)
        .env("PARTITION_MOVE_CONFIG", &cfg_path)
        .current_dir(&base)
        .arg(&source)
        .arg(&dest)
        .arg("--exclude-name")
        .arg("_SUCCESS")
        .output()
        .expect("spawn binary");

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(dest.join(&d).join("data.log").exists());
    assert!(!dest.join(&d).join("_SUCCESS").exists());
}
