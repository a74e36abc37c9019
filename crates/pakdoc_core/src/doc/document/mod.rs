use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::doc::{
	ExportBody, ExportRecord, FloatFormat, NodeId, NodeRef, NodeRole, PackageRecord, Property, Result, Tree, adapt_fields,
	adapt_property,
};

/// Classification of an export by the shape of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
	/// Keyed localizable strings.
	StringTable,
	/// Typed rows.
	DataTable,
	/// Generated class carrying a parent reference.
	Blueprint,
	/// Any other object.
	DataObject,
}

impl ExportKind {
	/// Classify an export payload.
	pub fn of(body: &ExportBody) -> Self {
		match body {
			ExportBody::StringTable { .. } => Self::StringTable,
			ExportBody::DataTable { .. } => Self::DataTable,
			ExportBody::BlueprintClass { .. } => Self::Blueprint,
			ExportBody::Object { .. } => Self::DataObject,
		}
	}

	/// Stable label; also the type tag of the export's `Data` node.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::StringTable => "StringTable",
			Self::DataTable => "DataTable",
			Self::Blueprint => "Blueprint",
			Self::DataObject => "DataObject",
		}
	}
}

/// Materialized tree for one loaded package.
///
/// Layout below the root: `FullPath` (text), then `Exports`, holding one
/// export node per record. Each export node carries `Flags`, `FlagsDesc` and
/// a `Data` child; blueprint exports add `IsCooked`, `ClassFlags`,
/// `ClassConfigName`, `SuperStruct` and `SSPackageIndex`.
#[derive(Debug)]
pub struct Document {
	path: String,
	tree: Tree,
	root: NodeId,
	exports: NodeId,
	default_export: Option<NodeId>,
}

impl Document {
	/// Build a document from a decoded package record.
	///
	/// The default export is the first export, replaced by any later export
	/// flagged as a class default object. A fault in any export aborts the
	/// whole document.
	pub fn build(record: &PackageRecord, format: FloatFormat) -> Result<Self> {
		let mut tree = Tree::with_format(format);
		let root = tree.create(document_name(&record.path), "Asset Package");
		tree.set_role(root, NodeRole::Document);

		let full_path = tree.create_text("FullPath", "String", record.path.as_str());
		tree.add(root, full_path);
		let exports = tree.create("Exports", "Asset Exports");
		tree.add(root, exports);

		let mut default_export = None;
		for export in &record.exports {
			let node = build_export(&mut tree, export)?;
			if !tree.add(exports, node) {
				continue;
			}
			if default_export.is_none() || export.flags.is_class_default() {
				default_export = Some(node);
			}
		}

		debug!(path = %record.path, exports = record.exports.len(), "document built");
		Ok(Self {
			path: record.path.clone(),
			tree,
			root,
			exports,
			default_export,
		})
	}

	/// Package path this document was loaded from.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Last path segment without extension.
	pub fn name(&self) -> &str {
		self.root().name()
	}

	/// Owning arena.
	pub fn tree(&self) -> &Tree {
		&self.tree
	}

	/// Document root node.
	pub fn root(&self) -> NodeRef<'_> {
		self.tree.node(self.root)
	}

	/// Exports in package order.
	pub fn exports(&self) -> impl Iterator<Item = ExportRef<'_>> + '_ {
		self.tree.node(self.exports).children().filter_map(ExportRef::from_node)
	}

	/// Designated default export.
	pub fn default_export(&self) -> Option<ExportRef<'_>> {
		self.default_export.and_then(|id| ExportRef::from_node(self.tree.node(id)))
	}

	/// Named export, or the default export when `name` is `None` or empty.
	pub fn export(&self, name: Option<&str>) -> Option<ExportRef<'_>> {
		match name.filter(|name| !name.is_empty()) {
			Some(name) => self.tree.node(self.exports).child(name).and_then(ExportRef::from_node),
			None => self.default_export(),
		}
	}

	/// `Data` node of [`Document::export`].
	pub fn export_data(&self, name: Option<&str>) -> Option<NodeRef<'_>> {
		self.export(name)?.data()
	}

	/// Re-designate the default export; unknown names leave it unchanged.
	pub fn set_default_export(&mut self, name: &str) -> bool {
		let Some(id) = self.export(Some(name)).map(|export| export.node().id()) else {
			return false;
		};
		self.default_export = Some(id);
		true
	}
}

impl fmt::Display for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.root(), f)
	}
}

/// Borrowed view of one export node.
#[derive(Debug, Clone, Copy)]
pub struct ExportRef<'a> {
	node: NodeRef<'a>,
	kind: ExportKind,
}

impl<'a> ExportRef<'a> {
	/// View `node` as an export when it was built as one.
	pub fn from_node(node: NodeRef<'a>) -> Option<Self> {
		match node.role() {
			NodeRole::Export(kind) => Some(Self { node, kind }),
			_ => None,
		}
	}

	/// Underlying node.
	pub fn node(self) -> NodeRef<'a> {
		self.node
	}

	/// Export object name.
	pub fn name(self) -> &'a str {
		self.node.name()
	}

	/// Payload classification.
	pub fn kind(self) -> ExportKind {
		self.kind
	}

	/// The export's `Data` child.
	pub fn data(self) -> Option<NodeRef<'a>> {
		self.node.child("Data")
	}

	/// Source record the export was built from.
	pub fn record(self) -> Option<&'a ExportRecord> {
		self.node.value().downcast_opaque::<ExportRecord>()
	}

	/// Nearest document node above this export.
	pub fn document(self) -> Option<NodeRef<'a>> {
		self.node.enclosing_document()
	}
}

fn build_export(tree: &mut Tree, export: &ExportRecord) -> Result<NodeId> {
	let kind = ExportKind::of(&export.body);
	let node = tree.create(&export.name, &format!("{}Export", kind.as_str()));
	tree.set_role(node, NodeRole::Export(kind));
	tree.value_mut(node).set_opaque(Rc::new(export.clone()));

	let flags = tree.create_int("Flags", "Int", i64::from(export.flags.bits()));
	tree.add(node, flags);
	let flags_desc = tree.create_text("FlagsDesc", "String", export.flags.describe());
	tree.add(node, flags_desc);

	let data = tree.create("Data", kind.as_str());
	tree.add(node, data);

	match &export.body {
		ExportBody::StringTable { entries, .. } => {
			for entry in entries {
				let row = tree.create_text(&entry.key, "StringTableEntry", entry.value.as_str());
				for (meta_name, meta_value) in &entry.metadata {
					let meta = tree.create_text(meta_name, "StringTableEntryMetadata", meta_value.as_str());
					tree.add(row, meta);
				}
				tree.add(data, row);
			}
		}
		ExportBody::DataTable { row_struct, rows } => {
			let row_type = row_struct
				.as_ref()
				.and_then(|reference| reference.resolved.as_ref())
				.map_or("DataTableEntry", |target| target.name.as_str());
			for row in rows {
				let row_node = tree.create(&row.name, row_type);
				adapt_fields(tree, row_node, &row.fields)?;
				tree.add(data, row_node);
			}
		}
		ExportBody::BlueprintClass {
			cooked,
			class_flags,
			config_name,
			super_struct,
			properties,
		} => {
			adapt_fields(tree, data, properties)?;

			let is_cooked = tree.create_text("IsCooked", "Bool", if *cooked { "true" } else { "false" });
			tree.add(node, is_cooked);
			let flags = tree.create_uint("ClassFlags", "UInt", u64::from(*class_flags));
			tree.add(node, flags);
			let config = tree.create_text("ClassConfigName", "String", config_name.as_str());
			tree.add(node, config);

			let parent = tree.create("SuperStruct", "ObjectReference");
			adapt_property(tree, parent, None, &Property::Object(super_struct.clone()))?;
			tree.add(node, parent);
			let index = tree.create_int("SSPackageIndex", "Int", i64::from(super_struct.index));
			tree.add(node, index);
		}
		ExportBody::Object { properties } => adapt_fields(tree, data, properties)?,
	}

	Ok(node)
}

/// Last `/` segment of a package path, cut at the first `.`.
fn document_name(path: &str) -> &str {
	let last = path.rsplit('/').next().unwrap_or(path);
	last.split('.').next().unwrap_or(last)
}
