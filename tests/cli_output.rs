mod support;

use std::path::Path;
use std::process::Command;

use support::fixtures::{read_submission, write, write_test, write_train};
use tempfile::tempdir;

fn seed_workdir(root: &Path) {
    write_train(&root.join("dataset/train.csv"), 24);
    write_test(&root.join("dataset/test.csv"), &[5, 1, 9]);
    write(
        &root.join("comprank.toml"),
        "[forest]\nn_trees = 15\n\n[boost]\nrounds = 20\nmax_depth = 3\n",
    );
}

fn run_bin(exe: &str, root: &Path) -> std::process::Output {
    Command::new(exe)
        .current_dir(root)
        .env("COMPRANK_CONFIG_HOME", root.join("home"))
        .env("RUST_LOG", "warn")
        .output()
        .expect("spawn binary")
}

#[test]
fn forest_binary_prints_only_accuracy() {
    let temp = tempdir().expect("tempdir");
    seed_workdir(temp.path());

    let output = run_bin(env!("CARGO_BIN_EXE_comprank-train-forest"), temp.path());

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Training accuracy is: "));
    assert!(lines[0].ends_with('%'));
    assert_eq!(read_submission(&temp.path().join("submission.csv")).len(), 3);
    assert!(temp.path().join("home/.comprank/logs").is_dir());
}

#[test]
fn boost_binary_prints_accuracy_and_importances() {
    let temp = tempdir().expect("tempdir");
    seed_workdir(temp.path());

    let output = run_bin(env!("CARGO_BIN_EXE_comprank-train-boost"), temp.path());

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Training accuracy is: "));
    assert!(lines[1].starts_with("[(\"") && lines[1].ends_with(")]"));
    assert!(lines[1].contains("\"votes\""));
}

#[test]
fn binary_exits_nonzero_without_dataset() {
    let temp = tempdir().expect("tempdir");

    let output = run_bin(env!("CARGO_BIN_EXE_comprank-train-forest"), temp.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("train.csv"), "{stderr}");
    assert!(!temp.path().join("submission.csv").exists());
}
