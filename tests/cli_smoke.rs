use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use docshelf::{Category, Repository};
use serde_json::Value;

fn docshelf_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_docshelf"))
}

fn run(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(docshelf_bin())
        .args(args)
        .env("DOCSHELF_DATA_DIR", data_dir)
        .env("DOCSHELF_LOG", "warn")
        .output()
        .expect("failed to run docshelf")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn setup_fixture(dir: &Path) -> PathBuf {
    let inbox = dir.join("inbox");
    std::fs::create_dir_all(&inbox).unwrap();
    std::fs::write(inbox.join("A.txt"), "contains rule text").unwrap();
    std::fs::write(inbox.join("B.txt"), "contains case text").unwrap();
    inbox
}

#[test]
fn import_list_and_search() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    let inbox = setup_fixture(tmp.path());

    let import = run(&data, &["import", inbox.to_str().unwrap()]);
    assert!(import.status.success(), "{import:?}");
    assert!(stdout(&import).contains("2 imported, 0 failed"));

    let list = json(&run(&data, &["list", "--json"]));
    let titles: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|d| {
            (d["title"].as_str().unwrap(), d["category"].as_str().unwrap())
        })
        .collect();
    assert_eq!(titles, vec![("A.txt", "rules"), ("B.txt", "cases")]);

    let hits = json(&run(&data, &["search", "cades", "--json"]));
    assert_eq!(hits["threshold"], 0.3);
    assert_eq!(hits["results"][0]["title"], "B.txt");
    assert_eq!(hits["results"][0]["rank"], 1);

    let none = json(&run(&data, &["search", "zzzzz", "-t", "0.1", "--json"]));
    assert_eq!(none["resultCount"], 0);

    let everything = json(&run(&data, &["search", "", "--json"]));
    assert_eq!(everything["resultCount"], 2);
    assert!(everything["results"][0]["score"].is_null());
}

#[test]
fn update_and_delete_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");

    let add = run(&data, &["add", "--title", "ledger.txt", "reconciliation"]);
    assert!(add.status.success(), "{add:?}");

    let new_content = tmp.path().join("new.txt");
    std::fs::write(&new_content, "quarterly forecast").unwrap();
    let update = run(
        &data,
        &["update", "#1", "--content-file", new_content.to_str().unwrap()],
    );
    assert!(update.status.success(), "{update:?}");

    let old = json(&run(&data, &["search", "reconciliation", "--json"]));
    assert_eq!(old["resultCount"], 0);
    let new = json(&run(&data, &["search", "forecast", "--json"]));
    assert_eq!(new["resultCount"], 1);

    let doc = json(&run(&data, &["get", "1", "--json"]));
    assert_eq!(doc["content"], "quarterly forecast");
    assert_eq!(doc["title"], "ledger.txt");

    assert!(run(&data, &["delete", "1"]).status.success());
    let again = run(&data, &["delete", "1"]);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("NotFound"));
}

#[test]
fn config_threshold_is_used_by_search() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    let inbox = setup_fixture(tmp.path());
    assert!(run(&data, &["import", inbox.to_str().unwrap()]).status.success());

    let ok = |args: &[&str]| run(&data, args).status.success();
    assert!(ok(&["config", "set", "search.threshold", "0"]));
    let strict = json(&run(&data, &["search", "cades", "--json"]));
    assert_eq!(strict["resultCount"], 0);

    assert!(!ok(&["config", "set", "search.threshold", "7"]));

    assert!(ok(&["config", "clear", "search.threshold"]));
    let relaxed = json(&run(&data, &["search", "cades", "--json"]));
    assert_eq!(relaxed["results"][0]["title"], "B.txt");
}

#[test]
fn cli_writes_are_visible_to_the_library() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    let inbox = setup_fixture(tmp.path());
    assert!(run(&data, &["import", inbox.to_str().unwrap()]).status.success());

    let status = json(&run(&data, &["status", "--json"]));
    assert_eq!(status["documents"], 2);
    assert_eq!(status["dataDirSource"], "env");
    assert_eq!(status["categories"]["rules"], 1);

    let repo = Repository::open(&data.join("documents.redb")).unwrap();
    let cases = repo.list_by_category(Category::Cases).unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].title, "B.txt");
}

#[test]
fn import_of_only_bad_files_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    let empty = tmp.path().join("empty.txt");
    std::fs::write(&empty, "  ").unwrap();

    let import = run(&data, &["import", empty.to_str().unwrap()]);
    assert!(!import.status.success());
    assert!(String::from_utf8_lossy(&import.stderr).contains("empty.txt"));
}
