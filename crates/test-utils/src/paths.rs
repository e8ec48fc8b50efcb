//! Locating optional test data.
//!
//! Real corner lookup tables are too large to commit, so tests that need one
//! look for it here and skip when it is missing.

use std::path::PathBuf;

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// `crates/fixed-grid/testdata/`
pub fn testdata_dir() -> PathBuf {
    workspace_root()
        .join("crates")
        .join("fixed-grid")
        .join("testdata")
}

/// Searches for a test file in, in order:
/// 1. `$TEST_DATA_DIR`
/// 2. `crates/fixed-grid/testdata/`
/// 3. `testdata/` at the workspace root
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }
    candidates.push(testdata_dir().join(name));
    candidates.push(workspace_root().join("testdata").join(name));

    candidates.into_iter().find(|path| path.exists())
}

/// Temporary directory for lookup tables written during a test.
///
/// Removed when the returned `TempDir` is dropped.
pub fn temp_test_dir(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}
