use std::rc::Rc;

use crate::doc::{DocError, NodeId, Property, PropertyTag, Result, TextHistory, TextValue, Tree};

/// Materialize each tagged field as a child of `parent`.
///
/// Tags without a payload are skipped. A fault in any field aborts the whole
/// call; fields adapted before it stay attached.
pub fn adapt_fields(tree: &mut Tree, parent: NodeId, fields: &[PropertyTag]) -> Result<()> {
	for tag in fields {
		let Some(value) = &tag.value else {
			continue;
		};
		let child = property_node(tree, &tag.name, tag.tag_type.as_deref(), value)?;
		tree.set(parent, &tag.name, Some(child));
	}
	Ok(())
}

/// Allocate a detached node for one property and fill it.
///
/// The type tag is the declared type when given, else the struct type for
/// structs, else the shape label.
pub fn property_node(tree: &mut Tree, name: &str, declared_type: Option<&str>, property: &Property) -> Result<NodeId> {
	let declared_type = declared_type.filter(|label| !label.is_empty());
	let type_tag = match (declared_type, property) {
		(Some(label), _) => label,
		(None, Property::Struct(value)) => value.struct_type.as_deref().unwrap_or("StructProperty"),
		(None, other) => other.shape_name(),
	};
	let node = tree.create(name, type_tag);
	adapt_property(tree, node, declared_type, property)?;
	Ok(node)
}

/// Fill an existing node from one property value.
pub fn adapt_property(tree: &mut Tree, node: NodeId, declared_type: Option<&str>, property: &Property) -> Result<()> {
	match property {
		Property::Struct(value) => adapt_fields(tree, node, &value.fields)?,
		Property::Name(value) => {
			add_int(tree, node, "NameIndex", i64::from(value.index));
			tree.value_mut(node).set_text(value.text.as_str());
		}
		Property::Text(value) => adapt_text(tree, node, value)?,
		Property::Object(reference) => {
			add_int(tree, node, "PackageIndex", i64::from(reference.index));
			add_text(tree, node, "PackageIndexType", reference.kind().as_str());
			if let Some(target) = &reference.resolved {
				add_text(tree, node, "ObjectName", &target.name);
				add_text(tree, node, "ObjectClass", &target.qualified_class());
				add_text(tree, node, "ObjectAsset", &target.package);
			}
			tree.value_mut(node).set_opaque(Rc::new(reference.clone()));
		}
		Property::SoftObject { asset_path } => tree.value_mut(node).set_text(asset_path.as_str()),
		Property::Byte { value } => tree.value_mut(node).set_uint(u64::from(*value)),
		Property::Int16 { value } => tree.value_mut(node).set_int(i64::from(*value)),
		Property::Int { value } => tree.value_mut(node).set_int(i64::from(*value)),
		Property::Int64 { value } => tree.value_mut(node).set_int(*value),
		Property::UInt16 { value } => tree.value_mut(node).set_uint(u64::from(*value)),
		Property::UInt32 { value } => tree.value_mut(node).set_uint(u64::from(*value)),
		Property::UInt64 { value } => tree.value_mut(node).set_uint(*value),
		Property::Float { value } => tree.value_mut(node).set_float(f64::from(*value)),
		Property::Double { value } => tree.value_mut(node).set_float(*value),
		Property::Bool { value } => tree.value_mut(node).set_text(if *value { "true" } else { "false" }),
		Property::Str { value } => tree.value_mut(node).set_text(value.clone().unwrap_or_default()),
		Property::Enum { value } => tree.value_mut(node).set_text(value.as_str()),
		Property::Array(array) => {
			tree.set_array(node, true);
			let element_type = array.inner_type.as_deref().filter(|label| !label.is_empty() && *label != "Unknown");
			let Some(element_type) = element_type else {
				return Err(DocError::ArrayElementType {
					name: tree.node(node).name().to_owned(),
				});
			};
			for item in &array.items {
				let child = property_node(tree, "", Some(element_type), item)?;
				tree.set(node, "", Some(child));
			}
		}
		Property::Map(map) => {
			let key_type = label_or(&map.key_type, || map.entries.first().map(|entry| entry.key.shape_name()));
			let value_type = label_or(&map.value_type, || {
				map.entries.first().and_then(|entry| entry.value.as_ref()).map(Property::shape_name)
			});
			let entry_type = format!("MapValue<{key_type},{value_type}>");
			for entry in &map.entries {
				let key = render_detached(tree, &entry.key)?;
				let child = match &entry.value {
					Some(value) => {
						let child = property_node(tree, &key, Some(&entry_type), value)?;
						let text = render_detached(tree, value)?;
						tree.value_mut(child).set_text(text);
						child
					}
					None => tree.create_text(&key, &entry_type, ""),
				};
				tree.set(node, &key, Some(child));
			}
		}
		Property::Set(set) => {
			tree.set_array(node, true);
			let element_type = set_element_type(declared_type);
			for item in &set.items {
				let child = property_node(tree, "", Some(element_type), item)?;
				tree.set(node, "", Some(child));
			}
		}
		Property::FieldPath { path } => tree.value_mut(node).set_text(path.join(".")),
		Property::GameplayTags { tags } => {
			tree.set_array(node, true);
			for tag in tags {
				let child = tree.create_text("", "GameplayTag", tag.as_str());
				tree.set(node, "", Some(child));
			}
		}
		Property::Vector(vector) => {
			add_float(tree, node, "X", vector.x);
			add_float(tree, node, "Y", vector.y);
			add_float(tree, node, "Z", vector.z);
		}
		Property::Rotator(rotator) => {
			add_float(tree, node, "Pitch", rotator.pitch);
			add_float(tree, node, "Roll", rotator.roll);
			add_float(tree, node, "Yaw", rotator.yaw);
		}
		Property::Quat(quat) => {
			add_float(tree, node, "X", quat.x);
			add_float(tree, node, "Y", quat.y);
			add_float(tree, node, "Z", quat.z);
			add_float(tree, node, "W", quat.w);
		}
		Property::Color(color) => {
			for (name, channel) in [("A", color.a), ("R", color.r), ("G", color.g), ("B", color.b)] {
				let child = tree.create_uint(name, "Byte", u64::from(channel));
				tree.add(node, child);
			}
			tree.value_mut(node).set_text(color.hex());
		}
		Property::LinearColor(color) => {
			for (name, channel) in [("R", color.r), ("G", color.g), ("B", color.b), ("A", color.a)] {
				add_float(tree, node, name, f64::from(channel));
			}
			tree.value_mut(node).set_text(color.hex());
		}
		Property::IntPoint(point) => {
			add_int(tree, node, "X", i64::from(point.x));
			add_int(tree, node, "Y", i64::from(point.y));
		}
		Property::Guid(guid) => tree.value_mut(node).set_text(guid.to_string()),
		Property::RichCurveKey(key) => {
			add_text(tree, node, "InterpMode", &key.interp_mode);
			add_float(tree, node, "Time", f64::from(key.time));
			add_float(tree, node, "Value", f64::from(key.value));
			add_float(tree, node, "ArriveTangent", f64::from(key.arrive_tangent));
			add_float(tree, node, "LeaveTangent", f64::from(key.leave_tangent));
		}
		Property::VariableWithOffset(variable) => {
			add_text(tree, node, "Name", &variable.name);
			add_int(tree, node, "Offset", i64::from(variable.offset));
			let type_def = property_node(tree, "TypeDef", Some("Struct"), &variable.type_def)?;
			tree.add(node, type_def);
		}
		Property::Unrecognized => {
			let current = tree.node(node);
			return Err(DocError::UnrecognizedProperty {
				name: current.name().to_owned(),
				declared_type: current.type_tag().to_owned(),
			});
		}
	}
	Ok(())
}

fn adapt_text(tree: &mut Tree, node: NodeId, text: &TextValue) -> Result<()> {
	add_text(tree, node, "Type", text.history.kind_name());
	match &text.history {
		TextHistory::None => {
			add_uint(tree, node, "Flags", u64::from(text.flags));
		}
		TextHistory::Base { namespace, key } => {
			add_uint(tree, node, "Flags", u64::from(text.flags));
			add_text(tree, node, "Namespace", namespace);
			add_text(tree, node, "Key", key);
		}
		TextHistory::StringTableEntry { table_id, key } => {
			add_uint(tree, node, "Flags", u64::from(text.flags));
			add_text(tree, node, "TableId", table_id);
			add_text(tree, node, "Key", key);
		}
		other => {
			return Err(DocError::UnsupportedTextHistory {
				name: tree.node(node).name().to_owned(),
				kind: other.kind_name(),
			});
		}
	}
	tree.value_mut(node).set_text(text.display.clone().unwrap_or_default());
	Ok(())
}

/// Text rendering of a property materialized outside the document arena.
fn render_detached(tree: &Tree, property: &Property) -> Result<String> {
	let mut scratch = Tree::with_format(tree.format());
	let id = property_node(&mut scratch, "", None, property)?;
	Ok(scratch.node(id).as_text())
}

/// Element type of a set from its declared `SetProperty<Element>` label.
fn set_element_type(declared_type: Option<&str>) -> &str {
	let label = declared_type.unwrap_or("SetElement");
	match label.find('<') {
		Some(open) => {
			let inner = &label[open + 1..];
			inner.strip_suffix('>').unwrap_or(inner)
		}
		None => label,
	}
}

fn label_or<'a>(declared: &'a str, fallback: impl FnOnce() -> Option<&'static str>) -> &'a str {
	if declared.is_empty() { fallback().unwrap_or("Unknown") } else { declared }
}

fn add_text(tree: &mut Tree, parent: NodeId, name: &str, value: &str) {
	let child = tree.create_text(name, "String", value);
	tree.add(parent, child);
}

fn add_int(tree: &mut Tree, parent: NodeId, name: &str, value: i64) {
	let child = tree.create_int(name, "Int", value);
	tree.add(parent, child);
}

fn add_uint(tree: &mut Tree, parent: NodeId, name: &str, value: u64) {
	let child = tree.create_uint(name, "UInt", value);
	tree.add(parent, child);
}

fn add_float(tree: &mut Tree, parent: NodeId, name: &str, value: f64) {
	let child = tree.create_float(name, "Float", value);
	tree.add(parent, child);
}
