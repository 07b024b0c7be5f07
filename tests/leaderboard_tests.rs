use std::fs;

use blockfall::leaderboard::STORAGE_KEY;
use blockfall::store::FileStore;
use blockfall::{Entry, Leaderboard};
use tempfile::tempdir;

fn entry(name: &str, score: u32) -> Entry {
    Entry::dated(name, score, "2024-03-09".to_owned())
}

#[test]
fn table_survives_a_restart() {
    let dir = tempdir().unwrap();
    {
        let mut board = Leaderboard::load(FileStore::new(dir.path()));
        board.submit(entry("amy", 120)).unwrap();
        board.submit(entry("", 80)).unwrap();
    }
    let board = Leaderboard::load(FileStore::new(dir.path()));
    let names: Vec<&str> = board.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["amy", "Anonymous"]);
    assert!(board.qualifies(0));
}

#[test]
fn stored_blob_is_a_json_array() {
    let dir = tempdir().unwrap();
    let mut board = Leaderboard::load(FileStore::new(dir.path()));
    board.submit(entry("kim", 30)).unwrap();

    let raw = fs::read_to_string(dir.path().join(format!("{STORAGE_KEY}.json"))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{ "name": "kim", "score": 30, "date": "2024-03-09" }])
    );
}

#[test]
fn corrupt_file_starts_empty_and_is_overwritten() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(format!("{STORAGE_KEY}.json")), "garbage").unwrap();

    let mut board = Leaderboard::load(FileStore::new(dir.path()));
    assert!(board.entries().is_empty());
    board.submit(entry("lee", 10)).unwrap();

    let reloaded = Leaderboard::load(FileStore::new(dir.path()));
    assert_eq!(reloaded.entries().len(), 1);
}

#[test]
fn full_table_needs_a_strictly_higher_score() {
    let dir = tempdir().unwrap();
    let mut board = Leaderboard::load(FileStore::new(dir.path()));
    for (name, score) in [("a", 50), ("b", 40), ("c", 30)] {
        board.submit(entry(name, score)).unwrap();
    }
    assert!(!board.qualifies(0));
    assert!(!board.qualifies(30));
    assert!(board.qualifies(35));
    assert_eq!(board.submit(entry("d", 35)).unwrap(), Some(2));
    assert_eq!(board.entries().len(), 3);
}
