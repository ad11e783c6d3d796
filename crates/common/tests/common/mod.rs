//! Shared test utilities for filesystem integration tests
#![allow(dead_code)]

use common::testkit;
use common::vfs::{KeyFs, Registry};
use store::MemoryClient;

pub const ENDPOINT_URI: &str = "s3://endpoint1/";

/// Set up a filesystem bound to endpoint1 over a seeded in-memory store.
/// Objects are given as bucket-qualified keys, e.g. `("bucketA/file1", "data")`.
pub fn setup_fs(objects: &[(&str, &str)]) -> (KeyFs, MemoryClient, Registry) {
    let (fs, client, registry) = testkit::memory_fs(ENDPOINT_URI);
    for (location, data) in objects {
        let (bucket, key) = location
            .split_once('/')
            .expect("objects must be bucket-qualified");
        client.insert(bucket, key, data.to_string());
    }
    (fs, client, registry)
}
