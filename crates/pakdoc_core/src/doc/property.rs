use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::doc::OpaqueObject;

/// One named property as produced by the asset decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTag {
	/// Field name.
	pub name: String,
	/// Declared external type label, e.g. `ArrayProperty` or `StructProperty<Vector>`.
	#[serde(default)]
	pub tag_type: Option<String>,
	/// Decoded payload; tags without one are skipped.
	#[serde(default)]
	pub value: Option<Property>,
}

/// Closed set of property shapes the decoder classifies values into.
///
/// Deserializes from objects tagged by `"type"`. A tag outside this set
/// becomes [`Property::Unrecognized`] rather than a parse error so the
/// adapter can report it as a fault with context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Property {
	/// Nested record whose fields flatten into the owning node.
	Struct(StructValue),
	/// Interned name.
	Name(NameValue),
	/// Localizable text.
	Text(TextValue),
	/// Reference to an object in this or another package.
	Object(ObjectRef),
	/// Soft reference stored as an asset path.
	SoftObject {
		/// Asset path text.
		asset_path: String,
	},
	/// 8-bit unsigned.
	Byte {
		/// Payload.
		value: u8,
	},
	/// 16-bit signed.
	Int16 {
		/// Payload.
		value: i16,
	},
	/// 32-bit signed.
	Int {
		/// Payload.
		value: i32,
	},
	/// 64-bit signed.
	Int64 {
		/// Payload.
		value: i64,
	},
	/// 16-bit unsigned.
	UInt16 {
		/// Payload.
		value: u16,
	},
	/// 32-bit unsigned.
	UInt32 {
		/// Payload.
		value: u32,
	},
	/// 64-bit unsigned.
	UInt64 {
		/// Payload.
		value: u64,
	},
	/// 32-bit float.
	Float {
		/// Payload.
		value: f32,
	},
	/// 64-bit float.
	Double {
		/// Payload.
		value: f64,
	},
	/// Boolean, materialized as `"true"`/`"false"`.
	Bool {
		/// Payload.
		value: bool,
	},
	/// Plain string; a missing payload reads as empty.
	Str {
		/// Payload.
		#[serde(default)]
		value: Option<String>,
	},
	/// Enum value name.
	Enum {
		/// Enumerator text.
		value: String,
	},
	/// Ordered array of same-typed elements.
	Array(ArrayValue),
	/// Keyed map.
	Map(MapValue),
	/// Unordered set of elements.
	Set(SetValue),
	/// Path through nested fields.
	FieldPath {
		/// Path components.
		path: Vec<String>,
	},
	/// Gameplay tag container.
	GameplayTags {
		/// Tag names.
		tags: Vec<String>,
	},
	/// 3-component vector.
	Vector(Vector),
	/// Euler rotation.
	Rotator(Rotator),
	/// Quaternion.
	Quat(Quat),
	/// 8-bit RGBA color.
	Color(Color),
	/// Linear float RGBA color.
	LinearColor(LinearColor),
	/// Integer 2D point.
	IntPoint(IntPoint),
	/// 128-bit identifier.
	Guid(Guid),
	/// One key of a rich animation curve.
	RichCurveKey(RichCurveKey),
	/// Named typed variable at a buffer offset.
	VariableWithOffset(VariableWithOffset),
	/// Any shape the decoder produced that this crate does not model.
	#[serde(other)]
	Unrecognized,
}

impl Property {
	/// Shape label used in diagnostics and map type tags.
	pub fn shape_name(&self) -> &'static str {
		match self {
			Self::Struct(_) => "StructProperty",
			Self::Name(_) => "NameProperty",
			Self::Text(_) => "TextProperty",
			Self::Object(_) => "ObjectProperty",
			Self::SoftObject { .. } => "SoftObjectProperty",
			Self::Byte { .. } => "ByteProperty",
			Self::Int16 { .. } => "Int16Property",
			Self::Int { .. } => "IntProperty",
			Self::Int64 { .. } => "Int64Property",
			Self::UInt16 { .. } => "UInt16Property",
			Self::UInt32 { .. } => "UInt32Property",
			Self::UInt64 { .. } => "UInt64Property",
			Self::Float { .. } => "FloatProperty",
			Self::Double { .. } => "DoubleProperty",
			Self::Bool { .. } => "BoolProperty",
			Self::Str { .. } => "StrProperty",
			Self::Enum { .. } => "EnumProperty",
			Self::Array(_) => "ArrayProperty",
			Self::Map(_) => "MapProperty",
			Self::Set(_) => "SetProperty",
			Self::FieldPath { .. } => "FieldPathProperty",
			Self::GameplayTags { .. } => "GameplayTagContainer",
			Self::Vector(_) => "Vector",
			Self::Rotator(_) => "Rotator",
			Self::Quat(_) => "Quat",
			Self::Color(_) => "Color",
			Self::LinearColor(_) => "LinearColor",
			Self::IntPoint(_) => "IntPoint",
			Self::Guid(_) => "Guid",
			Self::RichCurveKey(_) => "RichCurveKey",
			Self::VariableWithOffset(_) => "VariableWithOffset",
			Self::Unrecognized => "Unrecognized",
		}
	}
}

/// Fields of a nested record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructValue {
	/// Declared struct type, when the decoder knows it.
	#[serde(default)]
	pub struct_type: Option<String>,
	/// Contained fields in declaration order.
	#[serde(default)]
	pub fields: Vec<PropertyTag>,
}

/// Interned name and its name-map slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameValue {
	/// Resolved text.
	pub text: String,
	/// Index into the package name map.
	#[serde(default)]
	pub index: i32,
}

/// Localizable text with its history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
	/// Text flags bitfield.
	#[serde(default)]
	pub flags: u32,
	/// How the display string was produced.
	#[serde(default)]
	pub history: TextHistory,
	/// Resolved display string.
	#[serde(default)]
	pub display: Option<String>,
}

/// Text history kinds, tagged by `"kind"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind")]
pub enum TextHistory {
	/// Culture-invariant literal.
	#[default]
	None,
	/// Namespaced localization key.
	Base {
		/// Localization namespace.
		#[serde(default)]
		namespace: String,
		/// Localization key.
		#[serde(default)]
		key: String,
	},
	/// Formatted from named arguments.
	NamedFormat,
	/// Formatted from ordered arguments.
	OrderedFormat,
	/// Formatted from typed arguments.
	ArgumentFormat,
	/// Number rendering.
	AsNumber,
	/// Percentage rendering.
	AsPercent,
	/// Currency rendering.
	AsCurrency,
	/// Date rendering.
	AsDate,
	/// Time rendering.
	AsTime,
	/// Date-time rendering.
	AsDateTime,
	/// Case transform of another text.
	Transform,
	/// Entry of a string table.
	StringTableEntry {
		/// Table identifier.
		table_id: String,
		/// Entry key.
		key: String,
	},
	/// Produced by a text generator.
	TextGenerator,
	/// Any kind not listed above.
	#[serde(other)]
	Unrecognized,
}

impl TextHistory {
	/// Stable kind label, recorded as the `Type` child.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::None => "None",
			Self::Base { .. } => "Base",
			Self::NamedFormat => "NamedFormat",
			Self::OrderedFormat => "OrderedFormat",
			Self::ArgumentFormat => "ArgumentFormat",
			Self::AsNumber => "AsNumber",
			Self::AsPercent => "AsPercent",
			Self::AsCurrency => "AsCurrency",
			Self::AsDate => "AsDate",
			Self::AsTime => "AsTime",
			Self::AsDateTime => "AsDateTime",
			Self::Transform => "Transform",
			Self::StringTableEntry { .. } => "StringTableEntry",
			Self::TextGenerator => "TextGenerator",
			Self::Unrecognized => "Unrecognized",
		}
	}
}

/// Package-relative object reference.
///
/// Negative indices address imports, positive ones exports, zero is null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
	/// Raw package index.
	pub index: i32,
	/// Target details when the decoder could resolve them without a full load.
	#[serde(default)]
	pub resolved: Option<ResolvedObject>,
}

impl ObjectRef {
	/// Import/export classification of the raw index.
	pub fn kind(&self) -> RefKind {
		match self.index {
			index if index < 0 => RefKind::Import,
			index if index > 0 => RefKind::Export,
			_ => RefKind::Unknown,
		}
	}

	/// Path of the package holding the target, when resolved.
	pub fn target_package(&self) -> Option<&str> {
		self.resolved.as_ref().map(|target| target.package.as_str()).filter(|path| !path.is_empty())
	}
}

impl fmt::Display for ObjectRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.resolved {
			Some(target) => write!(f, "{}:{} ({})", self.kind().as_str(), self.index, target.name),
			None => write!(f, "{}:{}", self.kind().as_str(), self.index),
		}
	}
}

impl OpaqueObject for ObjectRef {
	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Classification of an [`ObjectRef`] index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
	/// Lives in another package.
	Import,
	/// Lives in this package.
	Export,
	/// Null index.
	Unknown,
}

impl RefKind {
	/// Stable label, recorded as the `PackageIndexType` child.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Import => "Import",
			Self::Export => "Export",
			Self::Unknown => "Unknown",
		}
	}
}

/// Resolved target of an object reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedObject {
	/// Object name.
	pub name: String,
	/// Class name.
	#[serde(default)]
	pub class: Option<String>,
	/// Name of the class's owner, e.g. its script package.
	#[serde(default)]
	pub class_outer: Option<String>,
	/// Path of the package the object lives in.
	#[serde(default)]
	pub package: String,
}

impl ResolvedObject {
	/// `outer.class` when both parts are known, else the bare class name.
	pub fn qualified_class(&self) -> String {
		let class = self.class.as_deref().unwrap_or_default();
		match self.class_outer.as_deref() {
			Some(outer) if !outer.is_empty() && !class.is_empty() => format!("{outer}.{class}"),
			_ => class.to_owned(),
		}
	}
}

/// Array payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
	/// Declared element type; required to materialize elements.
	#[serde(default)]
	pub inner_type: Option<String>,
	/// Elements in order.
	#[serde(default)]
	pub items: Vec<Property>,
}

/// Map payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
	/// Declared key type.
	#[serde(default)]
	pub key_type: String,
	/// Declared value type.
	#[serde(default)]
	pub value_type: String,
	/// Entries in stored order.
	#[serde(default)]
	pub entries: Vec<MapEntry>,
}

/// One map entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
	/// Entry key.
	pub key: Property,
	/// Entry value; absent values read as empty text.
	#[serde(default)]
	pub value: Option<Property>,
}

/// Set payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetValue {
	/// Elements in stored order.
	#[serde(default)]
	pub items: Vec<Property>,
}

/// 3-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
	/// X.
	pub x: f64,
	/// Y.
	pub y: f64,
	/// Z.
	pub z: f64,
}

/// Euler rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
	/// Pitch.
	pub pitch: f64,
	/// Yaw.
	pub yaw: f64,
	/// Roll.
	pub roll: f64,
}

/// Quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
	/// X.
	pub x: f64,
	/// Y.
	pub y: f64,
	/// Z.
	pub z: f64,
	/// W.
	pub w: f64,
}

/// 8-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha.
	pub a: u8,
}

impl Color {
	/// `RRGGBBAA` uppercase hex.
	pub fn hex(self) -> String {
		format!("{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
	}
}

/// Linear-space float color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearColor {
	/// Red.
	pub r: f32,
	/// Green.
	pub g: f32,
	/// Blue.
	pub b: f32,
	/// Alpha.
	pub a: f32,
}

impl LinearColor {
	/// sRGB-encoded 8-bit equivalent, alpha kept linear.
	pub fn to_srgb(self) -> Color {
		fn encode(channel: f32) -> u8 {
			let clamped = channel.clamp(0.0, 1.0);
			let srgb = if clamped <= 0.003_130_8 {
				clamped * 12.92
			} else {
				1.055 * clamped.powf(1.0 / 2.4) - 0.055
			};
			(srgb * 255.0).round() as u8
		}

		Color {
			r: encode(self.r),
			g: encode(self.g),
			b: encode(self.b),
			a: (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
		}
	}

	/// Hex of the sRGB-encoded color.
	pub fn hex(self) -> String {
		self.to_srgb().hex()
	}
}

/// Integer point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntPoint {
	/// X.
	pub x: i32,
	/// Y.
	pub y: i32,
}

/// 128-bit identifier as four words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guid {
	/// Word A.
	pub a: u32,
	/// Word B.
	pub b: u32,
	/// Word C.
	pub c: u32,
	/// Word D.
	pub d: u32,
}

impl fmt::Display for Guid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:08X}{:08X}{:08X}{:08X}", self.a, self.b, self.c, self.d)
	}
}

/// Curve key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichCurveKey {
	/// Interpolation mode name.
	#[serde(default)]
	pub interp_mode: String,
	/// Key time.
	pub time: f32,
	/// Key value.
	pub value: f32,
	/// Incoming tangent.
	#[serde(default)]
	pub arrive_tangent: f32,
	/// Outgoing tangent.
	#[serde(default)]
	pub leave_tangent: f32,
}

/// Variable descriptor with a buffer offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableWithOffset {
	/// Variable name.
	pub name: String,
	/// Byte offset.
	pub offset: i32,
	/// Type definition record.
	pub type_def: Box<Property>,
}
