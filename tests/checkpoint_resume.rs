use assert_cmd::cargo;
use chrono::Local;
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

fn run(base: &Path, cfg: &Path, source: &Path, dest: &Path) -> std::process::Output {
    let me = cargo::cargo_bin!("partition_move");
    Command::new(me)
        .env("PARTITION_MOVE_CONFIG", cfg)
        .current_dir(base)
        .arg(source)
        .arg(dest)
        .output()
        .expect("spawn binary")
}

// Back-to-back runs: the second picks up from the recorded checkpoint and
// only transfers what appeared in between.
#[test]
fn second_run_resumes_and_moves_only_new_files() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg_path = write_cfg(&base);
    let source = base.join("src");
    let dest = base.join("dst");

    let d = Local::now().date_naive().format("%Y%m%d").to_string();
    fs::create_dir_all(source.join(&d)).unwrap();
    fs::write(source.join(&d).join("first.log"), b"first").unwrap();

    let out1 = run(&base, &cfg_path, &source, &dest);
    assert!(
        out1.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out1.stderr)
    );
    assert_eq!(
        fs::read_to_string(base.join("state").join("cp.txt"))
            .unwrap()
            .trim(),
        d
    );
    assert!(dest.join(&d).join("first.log").exists());

    // A new file lands in the same partition before the next scheduled run.
    fs::write(source.join(&d).join("second.log"), b"second").unwrap();

    let out2 = run(&base, &cfg_path, &source, &dest);
    assert!(
        out2.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out2.stderr)
    );
    let stdout = String::from_utf8_lossy(&out2.stdout);
    assert!(
        stdout.contains("Transferred 1/1"),
        "second run should move exactly the new file: {stdout}"
    );
    assert!(dest.join(&d).join("second.log").exists());
}

// A fully mirrored tree leaves nothing pending: the diff is idempotent.
#[test]
fn rerun_on_unchanged_trees_moves_nothing() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg_path = write_cfg(&base);
    let source = base.join("src");
    let dest = base.join("dst");

    let d = Local::now().date_naive().format("%Y%m%d").to_string();
    fs::create_dir_all(source.join(&d)).unwrap();
    fs::write(source.join(&d).join("a.log"), b"a").unwrap();
    fs::write(source.join(&d).join("b.log"), b"b").unwrap();

    let out1 = run(&base, &cfg_path, &source, &dest);
    assert!(out1.status.success());

    let out2 = run(&base, &cfg_path, &source, &dest);
    assert!(out2.status.success());
    let stdout = String::from_utf8_lossy(&out2.stdout);
    assert!(
        stdout.contains("Transferred 0/0"),
        "nothing should remain pending: {stdout}"
    );
}
