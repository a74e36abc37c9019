use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::doc::{ExportKind, ExportRef, FloatFormat, PathResolver, ScalarValue, ValueKind};

/// Index of one node inside its owning [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	/// Raw arena slot.
	pub fn index(self) -> usize {
		self.0
	}
}

/// What a node stands for beyond its generic tree shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeRole {
	/// Ordinary field or container.
	#[default]
	Plain,
	/// Root of a materialized package.
	Document,
	/// Top-level record within a package.
	Export(ExportKind),
}

#[derive(Debug, Clone, Default)]
struct ChildMap {
	order: Vec<(Box<str>, NodeId)>,
	by_name: HashMap<Box<str>, usize>,
}

impl ChildMap {
	fn get(&self, name: &str) -> Option<NodeId> {
		let idx = self.by_name.get(name)?;
		self.order.get(*idx).map(|(_, id)| *id)
	}

	/// Insert or replace in place, returning the replaced child.
	fn insert(&mut self, name: &str, id: NodeId) -> Option<NodeId> {
		if let Some(idx) = self.by_name.get(name) {
			let slot = &mut self.order[*idx].1;
			return Some(std::mem::replace(slot, id));
		}

		self.by_name.insert(name.into(), self.order.len());
		self.order.push((name.into(), id));
		None
	}

	fn remove(&mut self, name: &str) -> Option<NodeId> {
		let idx = self.by_name.remove(name)?;
		let (_, id) = self.order.remove(idx);
		for (key, _) in &self.order[idx..] {
			if let Some(pos) = self.by_name.get_mut(key) {
				*pos -= 1;
			}
		}
		Some(id)
	}

	fn key_of(&self, id: NodeId) -> Option<&str> {
		self.order.iter().find(|(_, candidate)| *candidate == id).map(|(key, _)| &**key)
	}

	fn len(&self) -> usize {
		self.order.len()
	}
}

#[derive(Debug, Clone)]
struct NodeData {
	name: String,
	type_tag: String,
	is_array: bool,
	role: NodeRole,
	children: ChildMap,
	value: ScalarValue,
	parent: Option<NodeId>,
	highest_index: i64,
}

/// Arena owning every node of one document.
///
/// Parent to child edges own; `parent` links are plain indices used only for
/// upward walks. Nodes that are replaced or removed stay allocated but become
/// unreachable from their former parent.
#[derive(Debug, Clone, Default)]
pub struct Tree {
	nodes: Vec<NodeData>,
	format: FloatFormat,
}

impl Tree {
	/// Empty arena with the default float format.
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty arena whose new values render floats with `format`.
	pub fn with_format(format: FloatFormat) -> Self {
		Self { nodes: Vec::new(), format }
	}

	/// Float format given to newly created values.
	pub fn format(&self) -> FloatFormat {
		self.format
	}

	/// Number of allocated nodes, reachable or not.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether no node was ever allocated.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Allocate a detached node.
	pub fn create(&mut self, name: &str, type_tag: &str) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(NodeData {
			name: name.trim().to_owned(),
			type_tag: type_tag.to_owned(),
			is_array: false,
			role: NodeRole::Plain,
			children: ChildMap::default(),
			value: ScalarValue::with_format(self.format),
			parent: None,
			highest_index: -1,
		});
		id
	}

	/// Allocate a detached node holding text.
	pub fn create_text(&mut self, name: &str, type_tag: &str, value: impl Into<String>) -> NodeId {
		let id = self.create(name, type_tag);
		self.value_mut(id).set_text(value);
		id
	}

	/// Allocate a detached node holding a signed integer.
	pub fn create_int(&mut self, name: &str, type_tag: &str, value: i64) -> NodeId {
		let id = self.create(name, type_tag);
		self.value_mut(id).set_int(value);
		id
	}

	/// Allocate a detached node holding an unsigned integer.
	pub fn create_uint(&mut self, name: &str, type_tag: &str, value: u64) -> NodeId {
		let id = self.create(name, type_tag);
		self.value_mut(id).set_uint(value);
		id
	}

	/// Allocate a detached node holding a float.
	pub fn create_float(&mut self, name: &str, type_tag: &str, value: f64) -> NodeId {
		let id = self.create(name, type_tag);
		self.value_mut(id).set_float(value);
		id
	}

	/// Read-only view of one node.
	pub fn node(&self, id: NodeId) -> NodeRef<'_> {
		NodeRef { tree: self, id }
	}

	/// Mutable access to a node's value slot.
	pub fn value_mut(&mut self, id: NodeId) -> &mut ScalarValue {
		&mut self.nodes[id.0].value
	}

	/// Flag a node as an auto-indexed array.
	pub fn set_array(&mut self, id: NodeId, is_array: bool) {
		self.nodes[id.0].is_array = is_array;
	}

	/// Replace a node's type tag.
	pub fn set_type_tag(&mut self, id: NodeId, type_tag: &str) {
		type_tag.clone_into(&mut self.nodes[id.0].type_tag);
	}

	pub(crate) fn set_role(&mut self, id: NodeId, role: NodeRole) {
		self.nodes[id.0].role = role;
	}

	/// Insert `child` under `parent` keyed by `name`, or delete `name` when `child` is `None`.
	///
	/// Array parents assign `highest index + 1` for an empty key and advance
	/// the counter past explicit integer keys. Other parents fall back to the
	/// child's own name and skip the insert when both are empty. An existing
	/// entry under the key is replaced; re-setting a child under its current
	/// key leaves it in place. An auto key past `i64::MAX` is refused. Returns
	/// whether `child` is attached.
	pub fn set(&mut self, parent: NodeId, name: &str, child: Option<NodeId>) -> bool {
		let mut key = name.trim().to_owned();
		let Some(child) = child else {
			if !key.is_empty() {
				self.remove(parent, &key);
			}
			return false;
		};

		if self.is_ancestor_or_self(child, parent) {
			warn!(parent = parent.0, child = child.0, "refusing insert that would create a cycle");
			return false;
		}

		let child_unnamed = self.nodes[child.0].name.is_empty();
		let target = &mut self.nodes[parent.0];
		if target.is_array {
			if key.is_empty() {
				let Some(next) = target.highest_index.checked_add(1) else {
					warn!(parent = parent.0, "array index space exhausted, refusing insert");
					return false;
				};
				target.highest_index = next;
				key = next.to_string();
			} else if let Ok(index) = key.parse::<i64>()
				&& index > target.highest_index
			{
				target.highest_index = index;
			}
		} else if key.is_empty() {
			if child_unnamed {
				return false;
			}
			key.clone_from(&self.nodes[child.0].name);
		}

		if child_unnamed {
			key.clone_into(&mut self.nodes[child.0].name);
		}

		let in_place = self.nodes[child.0].parent == Some(parent) && self.nodes[parent.0].children.get(&key) == Some(child);
		if in_place {
			return true;
		}

		self.detach(child);
		self.nodes[child.0].parent = Some(parent);
		if let Some(replaced) = self.nodes[parent.0].children.insert(&key, child)
			&& replaced != child
		{
			self.nodes[replaced.0].parent = None;
		}
		true
	}

	/// Insert `child` under its own name.
	pub fn add(&mut self, parent: NodeId, child: NodeId) -> bool {
		let name = self.nodes[child.0].name.clone();
		self.set(parent, &name, Some(child))
	}

	/// Delete the child keyed `name`, returning it detached.
	pub fn remove(&mut self, parent: NodeId, name: &str) -> Option<NodeId> {
		let removed = self.nodes[parent.0].children.remove(name)?;
		self.nodes[removed.0].parent = None;
		Some(removed)
	}

	fn detach(&mut self, child: NodeId) {
		let Some(old_parent) = self.nodes[child.0].parent.take() else {
			return;
		};
		let Some(key) = self.nodes[old_parent.0].children.key_of(child).map(str::to_owned) else {
			return;
		};
		self.nodes[old_parent.0].children.remove(&key);
	}

	fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
		let mut current = Some(node);
		while let Some(id) = current {
			if id == candidate {
				return true;
			}
			current = self.nodes[id.0].parent;
		}
		false
	}
}

/// Borrowed handle to one node of a [`Tree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
	tree: &'a Tree,
	id: NodeId,
}

impl<'a> NodeRef<'a> {
	fn data(self) -> &'a NodeData {
		&self.tree.nodes[self.id.0]
	}

	/// Arena index of this node.
	pub fn id(self) -> NodeId {
		self.id
	}

	/// Owning arena.
	pub fn tree(self) -> &'a Tree {
		self.tree
	}

	/// Key of this node within its parent.
	pub fn name(self) -> &'a str {
		&self.data().name
	}

	/// Free-form origin/shape label.
	pub fn type_tag(self) -> &'a str {
		&self.data().type_tag
	}

	/// Whether children are keyed by sequential indices.
	pub fn is_array(self) -> bool {
		self.data().is_array
	}

	/// Document/export/plain classification.
	pub fn role(self) -> NodeRole {
		self.data().role
	}

	/// Scalar slot.
	pub fn value(self) -> &'a ScalarValue {
		&self.data().value
	}

	/// Enclosing node, if attached.
	pub fn parent(self) -> Option<NodeRef<'a>> {
		self.data().parent.map(|id| self.tree.node(id))
	}

	/// Exact single-key lookup without path interpretation.
	pub fn child(self, name: &str) -> Option<NodeRef<'a>> {
		self.data().children.get(name).map(|id| self.tree.node(id))
	}

	/// Look up a child by key, falling back to path resolution when `name` looks like a path.
	pub fn get(self, name: &str) -> Option<NodeRef<'a>> {
		if name.is_empty() {
			return None;
		}
		if let Some(found) = self.child(name) {
			return Some(found);
		}
		if name.contains('.') || name.ends_with(']') {
			return self.find(name);
		}
		None
	}

	/// Resolve a dotted, optionally bracket-indexed path below this node.
	pub fn find(self, path: &str) -> Option<NodeRef<'a>> {
		PathResolver::resolve(self, path)
	}

	/// Children in insertion order.
	pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
		let tree = self.tree;
		self.data().children.order.iter().map(move |(_, id)| tree.node(*id))
	}

	/// Child keys in insertion order.
	pub fn child_names(self) -> impl Iterator<Item = &'a str> + 'a {
		self.data().children.order.iter().map(|(key, _)| &**key)
	}

	/// First child in insertion order.
	pub fn first(self) -> Option<NodeRef<'a>> {
		self.children().next()
	}

	/// Child keys in lexicographic order.
	pub fn sorted_child_names(self) -> Vec<&'a str> {
		let mut names: Vec<&str> = self.child_names().collect();
		names.sort_unstable();
		names
	}

	/// Whether any child is present.
	pub fn has_children(self) -> bool {
		self.count() > 0
	}

	/// Whether the value slot holds anything.
	pub fn has_value(self) -> bool {
		!self.value().is_none()
	}

	/// Number of direct children.
	pub fn count(self) -> usize {
		self.data().children.len()
	}

	/// Nearest document node at or above this one.
	pub fn enclosing_document(self) -> Option<NodeRef<'a>> {
		self.ancestors().find(|node| node.role() == NodeRole::Document)
	}

	/// Nearest export node at or above this one.
	pub fn enclosing_export(self) -> Option<ExportRef<'a>> {
		self.ancestors().find_map(ExportRef::from_node)
	}

	/// This node followed by each parent up to the root.
	pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
		std::iter::successors(Some(self), |node| node.parent())
	}

	/// Text of child `name`, empty when absent.
	pub fn text_or_default(self, name: &str) -> &'a str {
		self.get(name).map_or("", |node| node.value().text())
	}

	/// Signed integer of child `name`, zero when absent.
	pub fn int_or_default(self, name: &str) -> i64 {
		self.get(name).map_or(0, |node| node.value().int())
	}

	/// Unsigned integer of child `name`, zero when absent.
	pub fn uint_or_default(self, name: &str) -> u64 {
		self.get(name).map_or(0, |node| node.value().uint())
	}

	/// Float of child `name`, zero when absent.
	pub fn float_or_default(self, name: &str) -> f64 {
		self.get(name).map_or(0.0, |node| node.value().float())
	}

	/// Textual rendering; same as `to_string()`.
	pub fn as_text(self) -> String {
		self.to_string()
	}
}

impl fmt::Display for NodeRef<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let node = *self;
		if matches!(node.value().kind(), ValueKind::Int | ValueKind::UInt | ValueKind::Float | ValueKind::Text) {
			return f.write_str(node.value().text());
		}

		match node.role() {
			NodeRole::Document => {
				let exports = node.child("Exports").map_or(0, NodeRef::count);
				return write!(f, "{}: {} Exports", node.name(), exports);
			}
			NodeRole::Export(kind) => {
				let data = node.child("Data").map_or(0, NodeRef::count);
				return write!(f, "{}: {} [{}]", node.name(), kind.as_str(), data);
			}
			NodeRole::Plain => {}
		}

		match node.type_tag() {
			"ObjectReference" | "ObjectProperty" => match node.child("PackageIndex") {
				Some(index) => write!(f, "{}:{}", node.type_tag(), index.value().text()),
				None => write!(f, "{} (Empty)", node.type_tag()),
			},
			other => write!(f, "{} [{}]", other, node.count()),
		}
	}
}

impl fmt::Debug for NodeRef<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NodeRef")
			.field("id", &self.id)
			.field("name", &self.name())
			.field("type_tag", &self.type_tag())
			.field("count", &self.count())
			.finish()
	}
}
