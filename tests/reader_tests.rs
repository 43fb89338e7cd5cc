// Index reader tests
// Binary search over variable-length lines straight from disk.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sorted_index::{Entry, Error, IndexBuilder, IndexReader, Options, validate_key};

// Helper: random lowercase keys of varied length, sorted and unique.
fn random_keys(rng: &mut StdRng, count: usize) -> Vec<String> {
    let mut keys: Vec<String> = (0..count)
        .map(|_| {
            let len = rng.gen_range(1..=12);
            (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
        })
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

fn write_index(path: &Path, entries: &[Entry]) {
    let body: String = entries.iter().map(Entry::encode_line).collect();
    fs::write(path, body).unwrap();
}

// =============================================================================
// Test 1: Every key reachable for index sizes 1..=64 and random line widths
// =============================================================================
#[test]
fn every_key_reachable_regardless_of_midpoints() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.tsv");
    let mut rng = StdRng::seed_from_u64(0xfeed);

    for size in 1..=64 {
        let keys = random_keys(&mut rng, size);
        let entries: Vec<Entry> = keys
            .iter()
            .map(|k| Entry::new(k.clone(), rng.gen_range(0..10_000_000_000u64)))
            .collect();
        write_index(&path, &entries);

        let reader = IndexReader::open(&path).unwrap();
        for entry in &entries {
            assert_eq!(
                reader.find(&entry.key).unwrap(),
                Some(entry.offset),
                "size {size}, key {:?}",
                entry.key
            );
        }
    }
}

// =============================================================================
// Test 2: Keys between, before and after existing ones → None
// =============================================================================
#[test]
fn absent_keys_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.tsv");
    let mut rng = StdRng::seed_from_u64(7);
    let keys = random_keys(&mut rng, 200);
    let entries: Vec<Entry> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| Entry::new(k.clone(), i as u64))
        .collect();
    write_index(&path, &entries);

    let reader = IndexReader::open(&path).unwrap();
    // Keys only use a-z, so a digit suffix never exists.
    for key in &keys {
        assert_eq!(reader.find(&format!("{key}0")).unwrap(), None);
    }
    assert_eq!(reader.find("").unwrap(), None);
    assert_eq!(reader.find("~").unwrap(), None);
}

// =============================================================================
// Test 3: Same query twice on an unchanged index → same answer
// =============================================================================
#[test]
fn repeated_queries_are_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.tsv");
    write_index(
        &path,
        &[
            Entry::new("00000000000001", 120),
            Entry::new("00000000000002", 55),
            Entry::new("00000000000003", 310),
        ],
    );

    let reader = IndexReader::open(&path).unwrap();
    let first = reader.find("00000000000002").unwrap();
    let second = reader.find("00000000000002").unwrap();
    assert_eq!(first, Some(55));
    assert_eq!(first, second);
    assert_eq!(reader.find("00000000000009").unwrap(), None);
    assert_eq!(reader.find("00000000000009").unwrap(), None);
}

// =============================================================================
// Test 4: Index produced by the builder → every record found
// =============================================================================
#[test]
fn lookup_over_built_index() {
    let dir = tempfile::tempdir().unwrap();
    let primary = dir.path().join("plain.tsv");
    let index = dir.path().join("index.tsv");

    let mut body = String::from("id\tvalue\n");
    let mut expected = Vec::new();
    for n in (0..500u64).rev() {
        expected.push((format!("{:014}", n * 7), body.len() as u64));
        body.push_str(&format!("{:014}\tvalue-{}\n", n * 7, "v".repeat((n % 9) as usize)));
    }
    fs::write(&primary, body).unwrap();

    IndexBuilder::new(Options::default().key_column(0).batch_size(45))
        .build(&primary, &index)
        .unwrap();

    let reader = IndexReader::open(&index).unwrap();
    for (key, offset) in &expected {
        assert_eq!(reader.find(key).unwrap(), Some(*offset));
    }
    assert_eq!(reader.find(&format!("{:014}", 8)).unwrap(), None);
}

// =============================================================================
// Test 5: Corrupt line hit by the search → Corruption error, not a wrong answer
// =============================================================================
#[test]
fn corrupt_line_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.tsv");
    fs::write(&path, "garbage without tab\n").unwrap();

    let reader = IndexReader::open(&path).unwrap();
    assert!(matches!(reader.find("x"), Err(Error::Corruption(_))));
}

// =============================================================================
// Test 6: Missing index file → NotFound; wrong key length → InvalidKey
// =============================================================================
#[test]
fn open_and_key_errors() {
    let dir = tempfile::tempdir().unwrap();
    let result = IndexReader::open(&dir.path().join("missing.tsv"));
    assert!(matches!(result, Err(Error::NotFound(_))));

    let err = validate_key("0000000000001", 14).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(validate_key("00000000000001", 14).is_ok());
}
