use std::time::{Duration, UNIX_EPOCH};

use skiff_core::{Entry, EntryKind, ListingOptions, ScanError};

#[test]
fn test_entry_snapshot_fields() {
    let modified = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let entry = Entry::new("report.pdf", EntryKind::File, 2048, modified);

    assert_eq!(entry.name.as_str(), "report.pdf");
    assert_eq!(entry.kind, EntryKind::File);
    assert_eq!(entry.size, 2048);
    assert_eq!(entry.modified, modified);
    assert!(!entry.hidden);
}

#[test]
fn test_entry_wire_schema() {
    let modified = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let entry = Entry::new(".profile", EntryKind::Executable, 64, modified);

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["name"], ".profile");
    assert_eq!(json["type"], "executable");
    assert_eq!(json["size"], 64);
    assert_eq!(json["mtime"], 1_700_000_000u64);
    assert_eq!(json["hidden"], true);

    let back: Entry = serde_json::from_value(json).unwrap();
    assert_eq!(back, entry);
}

#[test]
fn test_kind_tags_cover_all_variants() {
    let kinds = [
        EntryKind::File,
        EntryKind::Directory,
        EntryKind::Symlink,
        EntryKind::Executable,
    ];
    let mut tags: Vec<u8> = kinds.iter().map(|k| k.tag()).collect();
    tags.sort_unstable();
    tags.dedup();
    assert_eq!(tags.len(), kinds.len());
}

#[test]
fn test_error_display_names_path() {
    let err = ScanError::NotFound {
        path: "/nonexistent/x".into(),
    };
    assert!(err.to_string().contains("/nonexistent/x"));
}

#[test]
fn test_listing_options_builder_defaults() {
    let options = ListingOptions::builder().build().unwrap();
    assert!(!options.show_hidden);
    assert!(options.dirs_first);
    assert_eq!(options.limit, None);
}

#[test]
fn test_listing_pipeline() {
    let mut entries = vec![
        Entry::new("zz.log", EntryKind::File, 1, UNIX_EPOCH),
        Entry::new(".cache", EntryKind::Directory, 0, UNIX_EPOCH),
        Entry::new("docs", EntryKind::Directory, 0, UNIX_EPOCH),
        Entry::new("run.sh", EntryKind::Executable, 9, UNIX_EPOCH),
    ];

    ListingOptions::builder()
        .show_hidden(false)
        .dirs_first(true)
        .limit(Some(2usize))
        .build()
        .unwrap()
        .apply(&mut entries);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name.as_str(), "docs");
    assert_eq!(entries[1].name.as_str(), "zz.log");
}
