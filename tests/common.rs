use std::path::PathBuf;

/// Path to a fixture under `tests/data`.
pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Contents of a fixture under `tests/data`.
#[allow(dead_code)]
pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(data_path(name))
        .unwrap_or_else(|e| panic!("test file {} not found: {}", name, e))
}
