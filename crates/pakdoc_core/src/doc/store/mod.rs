use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::doc::{Archive, DocError, Document, ExportRef, FloatFormat, NodeId, NodeRef, ObjectRef, Result};

/// Behavior when the inheritance walk meets a document it already visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
	/// End the walk with not-found.
	Stop,
	/// Fail with [`DocError::InheritanceCycle`].
	Error,
}

/// Knobs for [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
	/// Allow documents to enter the cache at all.
	pub cache_documents: bool,
	/// Parent hops allowed before [`DocError::InheritanceDepthExceeded`].
	pub max_inheritance_depth: usize,
	/// Cycle handling during inheritance walks.
	pub on_cycle: StopMode,
	/// Float rendering for every document built by the store.
	pub float_format: FloatFormat,
}

impl Default for StoreOptions {
	fn default() -> Self {
		Self {
			cache_documents: true,
			max_inheritance_depth: 32,
			on_cycle: StopMode::Error,
			float_format: FloatFormat::default(),
		}
	}
}

impl StoreOptions {
	/// Defaults with caching disabled; every lookup reloads from the archive.
	pub fn uncached() -> Self {
		Self {
			cache_documents: false,
			..Self::default()
		}
	}
}

/// Counters kept by a [`DocumentStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
	/// Archive load attempts.
	pub archive_loads: usize,
	/// Lookups served from the cache.
	pub cache_hits: usize,
	/// Loads that produced no document, including folded archive errors.
	pub misses: usize,
}

/// Owned pointer to one node of a shared document.
#[derive(Debug, Clone)]
pub struct NodeHandle {
	document: Rc<Document>,
	node: NodeId,
}

impl NodeHandle {
	fn new(document: &Rc<Document>, node: NodeId) -> Self {
		Self {
			document: Rc::clone(document),
			node,
		}
	}

	/// Borrow the node.
	pub fn get(&self) -> NodeRef<'_> {
		self.document.tree().node(self.node)
	}

	/// Document the node belongs to.
	pub fn document(&self) -> &Rc<Document> {
		&self.document
	}

	/// Nearest export at or above the node.
	pub fn export(&self) -> Option<ExportRef<'_>> {
		self.get().enclosing_export()
	}
}

/// Split `/Game/A/Pkg.Export` into `("/Game/A/Pkg", Some("Export"))`.
///
/// Only a dot inside the last `/` segment counts as a suffix separator.
pub fn split_object_path(path: &str) -> (&str, Option<&str>) {
	let path = path.trim();
	let segment_start = path.rfind('/').map_or(0, |slash| slash + 1);
	match path[segment_start..].find('.') {
		Some(dot) => {
			let split = segment_start + dot;
			let suffix = &path[split + 1..];
			(&path[..split], (!suffix.is_empty()).then_some(suffix))
		}
		None => (path, None),
	}
}

/// Caching loader that turns archive records into [`Document`]s.
///
/// Archive failures fold into `Ok(None)` and are kept for diagnostics in
/// [`DocumentStore::last_archive_error`]. Adapter faults propagate as `Err`.
/// Cached documents stay until [`DocumentStore::clear_cache`].
#[derive(Debug)]
pub struct DocumentStore<A: Archive> {
	archive: A,
	options: StoreOptions,
	cache: HashMap<String, Rc<Document>>,
	stats: StoreStats,
	last_archive_error: Option<DocError>,
}

impl<A: Archive> DocumentStore<A> {
	/// Store over `archive` with default options.
	pub fn new(archive: A) -> Self {
		Self::with_options(archive, StoreOptions::default())
	}

	/// Store over `archive` with explicit options.
	pub fn with_options(archive: A, options: StoreOptions) -> Self {
		Self {
			archive,
			options,
			cache: HashMap::new(),
			stats: StoreStats::default(),
			last_archive_error: None,
		}
	}

	/// Backing archive.
	pub fn archive(&self) -> &A {
		&self.archive
	}

	/// Active options.
	pub fn options(&self) -> &StoreOptions {
		&self.options
	}

	/// Counters since construction.
	pub fn stats(&self) -> StoreStats {
		self.stats
	}

	/// Most recent archive failure folded into not-found.
	pub fn last_archive_error(&self) -> Option<&DocError> {
		self.last_archive_error.as_ref()
	}

	/// Whether the package named by `path` is cached.
	pub fn is_cached(&self, path: &str) -> bool {
		self.cache.contains_key(split_object_path(path).0)
	}

	/// Number of cached documents.
	pub fn cached_len(&self) -> usize {
		self.cache.len()
	}

	/// Drop every cached document.
	pub fn clear_cache(&mut self) {
		self.cache.clear();
	}

	/// Load the package named by `path`, ignoring any export suffix.
	///
	/// A cached document is returned as is. Otherwise the archive is asked
	/// and the result is built, then cached when `cache` is set and the
	/// options allow it.
	pub fn get_document(&mut self, path: &str, cache: bool) -> Result<Option<Rc<Document>>> {
		let (key, _) = split_object_path(path);
		if key.is_empty() {
			return Ok(None);
		}

		if let Some(document) = self.cache.get(key) {
			self.stats.cache_hits += 1;
			debug!(path = key, "document cache hit");
			return Ok(Some(Rc::clone(document)));
		}

		self.stats.archive_loads += 1;
		let record = match self.archive.load_package(key) {
			Ok(Some(record)) => record,
			Ok(None) => {
				self.stats.misses += 1;
				debug!(path = key, "document not in archive");
				return Ok(None);
			}
			Err(err) if err.is_fault() => return Err(err),
			Err(err) => {
				self.stats.misses += 1;
				warn!(path = key, error = %err, "archive load failed");
				self.last_archive_error = Some(err);
				return Ok(None);
			}
		};

		let document = Rc::new(Document::build(&record, self.options.float_format)?);
		if cache && self.options.cache_documents {
			self.cache.insert(key.to_owned(), Rc::clone(&document));
		}
		Ok(Some(document))
	}

	/// Named export of a package, or its default export.
	///
	/// Without `export_name`, an export suffix in `path` names the export.
	/// The package is read through the cache but not added to it.
	pub fn get_export(&mut self, path: &str, export_name: Option<&str>) -> Result<Option<NodeHandle>> {
		let (_, suffix) = split_object_path(path);
		let export_name = export_name.or(suffix);
		let Some(document) = self.get_document(path, false)? else {
			return Ok(None);
		};
		let id = document.export(export_name).map(|export| export.node().id());
		Ok(id.map(|id| NodeHandle::new(&document, id)))
	}

	/// `Data` node of [`DocumentStore::get_export`].
	pub fn get_export_data(&mut self, path: &str, export_name: Option<&str>) -> Result<Option<NodeHandle>> {
		let Some(export) = self.get_export(path, export_name)? else {
			return Ok(None);
		};
		let id = export.export().and_then(ExportRef::data).map(|data| data.id());
		Ok(id.map(|id| NodeHandle::new(export.document(), id)))
	}

	/// Resolve `field_path` on an export's data, walking parent documents on a miss.
	///
	/// Each step looks for the field on `export_name` (or the default export)
	/// of the current document. On a miss it follows the `SuperStruct`
	/// reference of the `<document name>_C` export to its package, loads that
	/// package through the cache, and repeats. The walk ends with not-found
	/// when there is no such export, the reference is unresolved, or the
	/// parent cannot be loaded.
	pub fn find_inheritable(
		&mut self,
		document: &Rc<Document>,
		export_name: Option<&str>,
		field_path: &str,
	) -> Result<Option<NodeHandle>> {
		let mut current = Rc::clone(document);
		let mut visited = HashSet::from([split_object_path(current.path()).0.to_owned()]);
		let mut hops = 0;

		loop {
			if let Some(found) = current.export_data(export_name).and_then(|data| data.get(field_path)) {
				let id = found.id();
				return Ok(Some(NodeHandle::new(&current, id)));
			}

			let Some(parent_path) = parent_package(&current) else {
				return Ok(None);
			};

			if hops >= self.options.max_inheritance_depth {
				return Err(DocError::InheritanceDepthExceeded {
					max_depth: self.options.max_inheritance_depth,
				});
			}
			hops += 1;

			if !visited.insert(parent_path.clone()) {
				return match self.options.on_cycle {
					StopMode::Stop => {
						debug!(path = %parent_path, "inheritance cycle, stopping");
						Ok(None)
					}
					StopMode::Error => Err(DocError::InheritanceCycle { path: parent_path }),
				};
			}

			debug!(from = current.path(), to = %parent_path, hops, field = field_path, "inheritance hop");
			let Some(parent) = self.get_document(&parent_path, true)? else {
				return Ok(None);
			};
			current = parent;
		}
	}
}

/// Package path named by the `SuperStruct` reference of `<name>_C`.
fn parent_package(document: &Document) -> Option<String> {
	let class_export = document.export(Some(&format!("{}_C", document.name())))?;
	let reference = class_export.node().child("SuperStruct")?.value().downcast_opaque::<ObjectRef>()?;
	let (path, _) = split_object_path(reference.target_package()?);
	(!path.is_empty()).then(|| path.to_owned())
}

#[cfg(test)]
mod tests;
