use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::doc::{DocError, PackageRecord, Result};

mod compression;

pub use compression::{Compression, ZSTD_MAGIC, decode_bytes};

/// Source of raw package records addressed by package path.
///
/// `Ok(None)` means the archive has no such package. `Err` means it does
/// but the bytes could not be read or decoded.
pub trait Archive {
	/// Stored bytes of one package, possibly compressed.
	fn load_raw(&self, path: &str) -> Result<Option<Vec<u8>>>;

	/// Decode one package record; an empty record path is filled from `path`.
	fn load_package(&self, path: &str) -> Result<Option<PackageRecord>> {
		let Some(raw) = self.load_raw(path)? else {
			return Ok(None);
		};
		decode_record(path, raw).map(Some)
	}
}

/// Decode stored bytes into a package record addressed as `path`.
pub fn decode_record(path: &str, raw: Vec<u8>) -> Result<PackageRecord> {
	let (compression, bytes) = decode_bytes(raw)?;
	debug!(path, compression = compression.as_str(), bytes = bytes.len(), "package bytes decoded");

	let mut record: PackageRecord = serde_json::from_slice(&bytes)?;
	if record.path.is_empty() {
		record.path = path.to_owned();
	}
	Ok(record)
}

/// In-memory archive holding decoded records or raw bytes.
///
/// Counts load attempts per path so callers can assert on cache behavior.
#[derive(Debug, Default)]
pub struct MemoryArchive {
	packages: HashMap<String, PackageRecord>,
	raw: HashMap<String, Vec<u8>>,
	loads: RefCell<HashMap<String, usize>>,
}

impl MemoryArchive {
	/// Empty archive.
	pub fn new() -> Self {
		Self::default()
	}

	/// Store a decoded record under its own path.
	pub fn insert_package(&mut self, record: PackageRecord) {
		self.packages.insert(record.path.clone(), record);
	}

	/// Store raw bytes under `path`; they decode on load like a file would.
	pub fn insert_raw(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
		self.raw.insert(path.into(), bytes);
	}

	/// Number of load attempts made for `path`, hits and misses alike.
	pub fn load_count(&self, path: &str) -> usize {
		self.loads.borrow().get(path).copied().unwrap_or_default()
	}

	/// Total load attempts across all paths.
	pub fn total_loads(&self) -> usize {
		self.loads.borrow().values().sum()
	}

	fn record_load(&self, path: &str) {
		*self.loads.borrow_mut().entry(path.to_owned()).or_default() += 1;
	}
}

impl Archive for MemoryArchive {
	fn load_raw(&self, path: &str) -> Result<Option<Vec<u8>>> {
		self.record_load(path);
		Ok(self.raw.get(path).cloned())
	}

	fn load_package(&self, path: &str) -> Result<Option<PackageRecord>> {
		if let Some(record) = self.packages.get(path) {
			self.record_load(path);
			return Ok(Some(record.clone()));
		}

		let Some(raw) = self.load_raw(path)? else {
			return Ok(None);
		};
		decode_record(path, raw).map(Some)
	}
}

/// Options for [`DirArchive::mount`].
#[derive(Debug, Clone)]
pub struct MountOptions {
	/// Match package paths without regard to ASCII case.
	pub case_insensitive: bool,
	/// File suffixes recognized as package records, tried in order.
	pub extensions: Vec<String>,
}

impl Default for MountOptions {
	fn default() -> Self {
		Self {
			case_insensitive: false,
			extensions: vec![".json.zst".to_owned(), ".json".to_owned()],
		}
	}
}

impl MountOptions {
	/// Defaults with case-insensitive lookup.
	pub fn case_insensitive() -> Self {
		Self {
			case_insensitive: true,
			..Self::default()
		}
	}
}

/// Archive over a directory tree of package record files.
///
/// `<root>/Game/Items/Sword.json` is addressed as `/Game/Items/Sword`.
/// The directory is indexed once at mount time.
#[derive(Debug)]
pub struct DirArchive {
	root: PathBuf,
	options: MountOptions,
	files: HashMap<String, PathBuf>,
}

impl DirArchive {
	/// Index every recognized file below `root`.
	pub fn mount(root: impl AsRef<Path>, options: MountOptions) -> Result<Self> {
		let root = root.as_ref().to_path_buf();
		if !root.is_dir() {
			return Err(DocError::MountRootMissing {
				root: root.display().to_string(),
			});
		}

		let mut archive = Self {
			root,
			options,
			files: HashMap::new(),
		};
		let mut pending = vec![archive.root.clone()];
		while let Some(dir) = pending.pop() {
			for entry in fs::read_dir(&dir)? {
				let path = entry?.path();
				if path.is_dir() {
					pending.push(path);
				} else if let Some(key) = archive.package_key(&path) {
					archive.files.entry(key).or_insert(path);
				}
			}
		}

		debug!(root = %archive.root.display(), packages = archive.files.len(), "archive mounted");
		Ok(archive)
	}

	/// Mounted directory.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Number of indexed packages.
	pub fn len(&self) -> usize {
		self.files.len()
	}

	/// Whether no package was found.
	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}

	/// Whether `path` names an indexed package.
	pub fn contains(&self, path: &str) -> bool {
		self.files.contains_key(&self.normalize(path))
	}

	/// File backing `path`, when indexed.
	pub fn file_for(&self, path: &str) -> Option<&Path> {
		self.files.get(&self.normalize(path)).map(PathBuf::as_path)
	}

	fn package_key(&self, file: &Path) -> Option<String> {
		let relative = file.strip_prefix(&self.root).ok()?;
		let mut key = String::new();
		for component in relative.components() {
			key.push('/');
			key.push_str(component.as_os_str().to_str()?);
		}

		let stem_len = self
			.options
			.extensions
			.iter()
			.find_map(|extension| key.strip_suffix(extension.as_str()).map(str::len))?;
		key.truncate(stem_len);
		Some(self.fold_case(key))
	}

	fn normalize(&self, path: &str) -> String {
		let trimmed = path.trim().replace('\\', "/");
		let key = if trimmed.starts_with('/') { trimmed } else { format!("/{trimmed}") };
		self.fold_case(key)
	}

	fn fold_case(&self, key: String) -> String {
		if self.options.case_insensitive { key.to_ascii_lowercase() } else { key }
	}
}

impl Archive for DirArchive {
	fn load_raw(&self, path: &str) -> Result<Option<Vec<u8>>> {
		let Some(file) = self.file_for(path) else {
			return Ok(None);
		};
		Ok(Some(fs::read(file)?))
	}
}
