//! Integration tests for emulated directory listings.

mod common;

use ::common::testkit;
use ::common::vfs::{DirEntry, EntryKind, FsError};
use futures::TryStreamExt;

fn entry(name: &str, kind: EntryKind) -> DirEntry {
    DirEntry {
        name: name.to_string(),
        kind,
    }
}

#[tokio::test]
async fn test_single_file() {
    let (fs, _client, _registry) = common::setup_fs(&[("bucketA/file1", "data")]);

    let bucket = fs.path("s3:///bucketA").unwrap();
    let children = testkit::collect(&fs, &bucket).await.unwrap();
    assert_eq!(children, vec![entry("file1", EntryKind::File)]);
}

#[tokio::test]
async fn test_two_files() {
    let (fs, _client, _registry) =
        common::setup_fs(&[("bucketA/file1", "a"), ("bucketA/file2", "b")]);

    let bucket = fs.path("s3:///bucketA").unwrap();
    let children = testkit::collect(&fs, &bucket).await.unwrap();
    assert_eq!(
        children,
        vec![
            entry("file1", EntryKind::File),
            entry("file2", EntryKind::File),
        ]
    );
}

#[tokio::test]
async fn test_pseudo_directory_not_expanded() {
    let (fs, _client, _registry) =
        common::setup_fs(&[("bucketA/file1", "a"), ("bucketA/dir1/x", "b")]);

    let bucket = fs.path("s3:///bucketA").unwrap();
    let children = testkit::collect(&fs, &bucket).await.unwrap();
    // dir1 surfaces once, never as dir1/x
    assert_eq!(
        children,
        vec![
            entry("dir1", EntryKind::Directory),
            entry("file1", EntryKind::File),
        ]
    );
}

#[tokio::test]
async fn test_nested_prefix_listing() {
    let (fs, _client, _registry) = common::setup_fs(&[
        ("bucketA/dir/a", "1"),
        ("bucketA/dir/sub/b", "2"),
        ("bucketA/other/c", "3"),
    ]);

    let dir = fs.path("s3:///bucketA/dir").unwrap();
    let children = testkit::collect(&fs, &dir).await.unwrap();
    assert_eq!(
        children,
        vec![
            entry("a", EntryKind::File),
            entry("sub", EntryKind::Directory),
        ]
    );
}

#[tokio::test]
async fn test_marker_object_with_children_is_directory() {
    // an explicit object at "d" plus deeper keys under "d/": one entry,
    // classified directory
    let (fs, _client, _registry) =
        common::setup_fs(&[("bucketA/d", "marker"), ("bucketA/d/x", "child")]);

    let bucket = fs.path("s3:///bucketA").unwrap();
    let children = testkit::collect(&fs, &bucket).await.unwrap();
    assert_eq!(children, vec![entry("d", EntryKind::Directory)]);
}

#[tokio::test]
async fn test_collision_across_page_boundary() {
    // testkit pages hold two entries; "b" (exact object) lands at a page
    // boundary and its children arrive with the next page
    let (fs, _client, _registry) = common::setup_fs(&[
        ("bucketA/a", "1"),
        ("bucketA/b", "2"),
        ("bucketA/b/x", "3"),
    ]);

    let bucket = fs.path("s3:///bucketA").unwrap();
    let children = testkit::collect(&fs, &bucket).await.unwrap();
    assert_eq!(
        children,
        vec![
            entry("a", EntryKind::File),
            entry("b", EntryKind::Directory),
        ]
    );
}

#[tokio::test]
async fn test_pagination_yields_each_child_once() {
    let names = ["c1", "c2", "c3", "c4", "c5"];
    let objects: Vec<(String, &str)> = names
        .iter()
        .map(|n| (format!("bucketA/{}", n), "x"))
        .collect();
    let borrowed: Vec<(&str, &str)> =
        objects.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let (fs, _client, _registry) = common::setup_fs(&borrowed);

    let bucket = fs.path("s3:///bucketA").unwrap();
    let children = testkit::collect(&fs, &bucket).await.unwrap();
    let seen: Vec<&str> = children.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(seen, names);
}

#[tokio::test]
async fn test_filter_excludes_entries() {
    let (fs, _client, _registry) = common::setup_fs(&[
        ("bucketA/dir1/x", "1"),
        ("bucketA/file1", "2"),
        ("bucketA/file2", "3"),
    ]);

    let bucket = fs.path("s3:///bucketA").unwrap();
    let files: Vec<DirEntry> = fs
        .list(&bucket, |entry| !entry.kind.is_dir())
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(
        files,
        vec![
            entry("file1", EntryKind::File),
            entry("file2", EntryKind::File),
        ]
    );
}

#[tokio::test]
async fn test_empty_prefix_is_empty_not_an_error() {
    let (fs, _client, _registry) = common::setup_fs(&[("bucketA/file1", "a")]);

    // the prefix exists as nothing at all; still an empty sequence
    let missing = fs.path("s3:///bucketA/no-such-dir").unwrap();
    let children = testkit::collect(&fs, &missing).await.unwrap();
    assert!(children.is_empty());

    let empty_bucket = fs.path("s3:///bucketB").unwrap();
    let children = testkit::collect(&fs, &empty_bucket).await.unwrap();
    assert!(children.is_empty());
}

#[tokio::test]
async fn test_early_termination_releases_stream() {
    let names = ["e1", "e2", "e3", "e4", "e5", "e6"];
    let objects: Vec<(String, &str)> = names
        .iter()
        .map(|n| (format!("bucketA/{}", n), "x"))
        .collect();
    let borrowed: Vec<(&str, &str)> =
        objects.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let (fs, _client, _registry) = common::setup_fs(&borrowed);

    let bucket = fs.path("s3:///bucketA").unwrap();
    let mut stream = fs.list(&bucket, |_| true).unwrap();
    let first = stream.try_next().await.unwrap().unwrap();
    assert_eq!(first.name, "e1");
    // dropping mid-listing releases the paging cursor
    drop(stream);
}

#[tokio::test]
async fn test_listing_recomputed_per_call() {
    let (fs, client, _registry) = common::setup_fs(&[("bucketA/file1", "a")]);
    let bucket = fs.path("s3:///bucketA").unwrap();

    let children = testkit::collect(&fs, &bucket).await.unwrap();
    assert_eq!(children.len(), 1);

    // no hierarchy cache: a fresh call sees the new object
    client.insert("bucketA", "file2", "b");
    let children = testkit::collect(&fs, &bucket).await.unwrap();
    assert_eq!(children.len(), 2);
}

#[tokio::test]
async fn test_list_on_closed_filesystem() {
    let (fs, _client, _registry) = common::setup_fs(&[("bucketA/file1", "a")]);
    let bucket = fs.path("s3:///bucketA").unwrap();
    fs.close();

    let err = match fs.list(&bucket, |_| true) {
        Ok(_) => panic!("expected error"),
        Err(e) => e,
    };
    assert!(matches!(err, FsError::Closed));
}
