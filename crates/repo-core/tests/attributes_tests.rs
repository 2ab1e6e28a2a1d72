//! Declaration coverage properties

use std::collections::BTreeSet;
use std::fs;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use repo_core::attributes::{DeclarationSet, validate};
use repo_core::Error;
use repo_fs::NormalizedPath;
use tempfile::TempDir;

const EXTENSIONS: &[&str] = &["bin", "psd", "pt", "zip", "wav"];

fn inventory_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        ("[a-z]{1,8}", prop::sample::select(EXTENSIONS)).prop_map(|(stem, ext)| format!("assets/{stem}.{ext}")),
        0..12,
    )
}

fn declared_strategy() -> impl Strategy<Value = BTreeSet<&'static str>> {
    prop::sample::subsequence(EXTENSIONS, 0..=EXTENSIONS.len())
        .prop_map(|exts| exts.into_iter().collect())
}

proptest! {
    #[test]
    fn test_uncovered_is_exactly_undeclared_extensions(
        inventory in inventory_strategy(),
        declared in declared_strategy(),
    ) {
        let content: String = declared
            .iter()
            .map(|ext| format!("*.{ext} filter=lfs diff=lfs merge=lfs -text\n"))
            .collect();
        let set = DeclarationSet::parse(&content);

        let expected: Vec<&str> = inventory
            .iter()
            .map(String::as_str)
            .filter(|path| !declared.iter().any(|ext| path.ends_with(&format!(".{ext}"))))
            .collect();

        prop_assert_eq!(set.uncovered(&inventory), expected);
    }

    #[test]
    fn test_exact_paths_always_cover_themselves(inventory in inventory_strategy()) {
        let content: String = inventory.iter().map(|p| format!("{p} filter=lfs\n")).collect();
        let set = DeclarationSet::parse(&content);

        prop_assert!(set.uncovered(&inventory).is_empty());
    }
}

#[test]
fn test_empty_inventory_skips_file_access() {
    let root = NormalizedPath::new("/definitely/not/a/checkout");
    validate(&root, &[]).unwrap();
}

#[test]
fn test_missing_file_with_inventory_fails() {
    let temp = TempDir::new().unwrap();
    let root = NormalizedPath::new(temp.path());

    let err = validate(&root, &["model.bin".to_string()]).unwrap_err();

    assert!(matches!(err, Error::MissingDeclarationsFile { .. }));
}

#[test]
fn test_wildcard_covers_every_matching_entry() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".gitattributes"), "*.bin filter=lfs\n").unwrap();
    let root = NormalizedPath::new(temp.path());

    validate(&root, &["a.bin".to_string(), "b.bin".to_string()]).unwrap();
}

#[test]
fn test_every_gap_is_reported() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".gitattributes"),
        "# tracked\n*.bin filter=lfs\n\nmodels/base.pt filter=lfs\n",
    )
    .unwrap();
    let root = NormalizedPath::new(temp.path());
    let inventory: Vec<String> = ["a.bin", "models/base.pt", "models/large.pt", "song.wav"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let err = validate(&root, &inventory).unwrap_err();

    match err {
        Error::UncoveredLargeFiles { files } => {
            assert_eq!(files, vec!["models/large.pt", "song.wav"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
