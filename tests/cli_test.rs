//! End-to-end tests of the `blockdex` binary: output, diagnostics and exit
//! status.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn blockdex(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blockdex"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("BLOCKDEX_NODE_CACHE_CAPACITY")
        .output()
        .expect("run blockdex")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_load_with_bad_row_exits_zero() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("idx.db");
    let csv = dir.path().join("data.csv");
    fs::write(&csv, "1,10\nx,20\n3,30\n").unwrap();

    assert!(blockdex(&[Path::new("create"), &index]).status.success());

    let output = blockdex(&[Path::new("load"), &index, &csv]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        format!("Loaded 2 rows from {} (1 skipped)\n", csv.display())
    );
    // The skipped row is reported on stderr
    assert!(String::from_utf8_lossy(&output.stderr).contains("skipping line 2"));

    let output = blockdex(&[Path::new("print"), &index]);
    assert_eq!(stdout(&output), "1: 10\n3: 30\n");
}

#[test]
fn test_insert_and_search() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("idx.db");
    blockdex(&[Path::new("create"), &index]);

    let output = blockdex(&[Path::new("insert"), &index, Path::new("42"), Path::new("100")]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Inserted 42: 100\n");

    let output = blockdex(&[Path::new("search"), &index, Path::new("42")]);
    assert_eq!(stdout(&output), "42: 100\n");
}

#[test]
fn test_fatal_errors_exit_one_and_name_file() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("idx.db");
    fs::write(&index, vec![0x41u8; 512]).unwrap();

    let output = blockdex(&[Path::new("print"), &index]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(&format!("Error: {}: bad magic", index.display())));

    let output = blockdex(&[Path::new("create"), &index]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_bad_arguments_exit_two() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("idx.db");
    blockdex(&[Path::new("create"), &index]);

    let output = blockdex(&[Path::new("insert"), &index, Path::new("-5"), Path::new("1")]);
    assert_eq!(output.status.code(), Some(2));
}
