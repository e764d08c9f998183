//! Golden tests for file-for-ai
//!
//! These tests merge the checked-in sample project and verify the exact
//! output layout, so format changes show up as test failures.

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn sample_project() -> PathBuf {
    fixtures_dir().join("sample_project")
}

fn ffa_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("file-for-ai"));
    cmd.arg("--no-color")
        .env_remove("FILE_FOR_AI_MODEL")
        .env_remove("FILE_FOR_AI_OUTPUT")
        .env_remove("FILE_FOR_AI_IGNORE_GITIGNORE")
        .env_remove("FILE_FOR_AI_PROCESS_NON_TEXT");
    cmd
}

/// Relative paths named in separator lines, in output order
fn separator_paths(merged: &str) -> Vec<String> {
    merged
        .lines()
        .filter_map(|l| l.strip_prefix(">>>>>> "))
        .filter_map(|l| l.strip_suffix(" <<<<<<"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_directory_merge_order() {
        let temp = tempdir().unwrap();
        let output = temp.path().join("merged.txt");

        ffa_cmd()
            .arg(sample_project())
            .arg("--output")
            .arg(&output)
            .assert()
            .success();

        let merged = fs::read_to_string(&output).unwrap();
        assert_eq!(
            separator_paths(&merged),
            vec!["README.md", "docs/guide.md", "src/main.rs"],
            "Files should be merged in sorted walk order, without Makefile or logo.png"
        );
    }

    #[test]
    fn golden_directory_merge_content() {
        let temp = tempdir().unwrap();
        let output = temp.path().join("merged.txt");

        ffa_cmd()
            .arg(sample_project())
            .arg("--output")
            .arg(&output)
            .assert()
            .success();

        let root = sample_project();
        let mut expected = String::new();
        for rel in ["README.md", "docs/guide.md", "src/main.rs"] {
            expected.push_str(&format!("\n\n>>>>>> {} <<<<<<\n\n", rel));
            expected.push_str(&fs::read_to_string(root.join(rel)).unwrap());
        }
        assert_eq!(fs::read_to_string(&output).unwrap(), expected);
    }

    #[test]
    fn golden_process_non_text_adds_binaries() {
        let temp = tempdir().unwrap();
        let output = temp.path().join("merged.txt");

        ffa_cmd()
            .arg(sample_project())
            .arg("--output")
            .arg(&output)
            .arg("--process-non-text")
            .assert()
            .success();

        let merged = fs::read_to_string(&output).unwrap();
        assert_eq!(
            separator_paths(&merged),
            vec![
                "Makefile",
                "README.md",
                "assets/logo.png",
                "docs/guide.md",
                "src/main.rs"
            ]
        );
    }

    #[test]
    fn golden_token_total_is_stable() {
        let temp = tempdir().unwrap();
        let output = temp.path().join("merged.txt");

        let run = || {
            let assert = ffa_cmd()
                .arg(sample_project())
                .arg("--output")
                .arg(&output)
                .arg("--json")
                .assert()
                .success();
            String::from_utf8_lossy(&assert.get_output().stdout).to_string()
        };

        let first = run();
        let second = run();
        assert_eq!(first, second);
        assert!(first.contains("\"files\":3"));
    }
}
