//! Shared test helpers for workspace crates.

use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Root of the mounted fixture game directory.
pub fn fixture_game_root() -> PathBuf {
	fixture_path("game")
}

/// Read and parse one JSON fixture file.
pub fn fixture_json(name: &str) -> serde_json::Value {
	let path = fixture_path(name);
	let bytes = fs::read(&path).unwrap_or_else(|err| panic!("fixture {} readable: {err}", path.display()));
	serde_json::from_slice(&bytes).unwrap_or_else(|err| panic!("fixture {} is valid json: {err}", path.display()))
}

/// Create a fresh scratch directory under the workspace target dir.
pub fn scratch_dir(label: &str) -> PathBuf {
	let dir = target_dir().join("pakdoc-scratch").join(format!("{label}-{}", std::process::id()));
	if dir.exists() {
		let _ = fs::remove_dir_all(&dir);
	}
	fs::create_dir_all(&dir).unwrap_or_else(|err| panic!("scratch dir {} created: {err}", dir.display()));
	dir
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}
