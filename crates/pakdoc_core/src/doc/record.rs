use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::doc::{ObjectRef, OpaqueObject, PropertyTag};

/// One decoded package as handed over by the asset decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
	/// Package path such as `/Game/Items/Sword`; filled from the lookup path when empty.
	#[serde(default)]
	pub path: String,
	/// Top-level records in declaration order.
	#[serde(default)]
	pub exports: Vec<ExportRecord>,
}

/// One top-level record of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
	/// Export object name.
	pub name: String,
	/// Class name.
	#[serde(default)]
	pub class: String,
	/// Object flags.
	#[serde(default)]
	pub flags: ObjectFlags,
	/// Kind-specific payload.
	pub body: ExportBody,
}

impl fmt::Display for ExportRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.class.is_empty() {
			f.write_str(&self.name)
		} else {
			write!(f, "{} ({})", self.name, self.class)
		}
	}
}

impl OpaqueObject for ExportRecord {
	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Kind-specific export payload, tagged by `"kind"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ExportBody {
	/// Keyed localizable strings.
	StringTable {
		/// Table namespace.
		#[serde(default)]
		namespace: String,
		/// Entries in stored order.
		#[serde(default)]
		entries: Vec<StringTableEntry>,
	},
	/// Rows sharing one struct type.
	DataTable {
		/// Row struct reference.
		#[serde(default)]
		row_struct: Option<ObjectRef>,
		/// Rows in stored order.
		#[serde(default)]
		rows: Vec<DataTableRow>,
	},
	/// Generated class with a parent reference.
	BlueprintClass {
		/// Whether the class was cooked.
		#[serde(default)]
		cooked: bool,
		/// Class flags bitfield.
		#[serde(default)]
		class_flags: u32,
		/// Config file name.
		#[serde(default)]
		config_name: String,
		/// Parent class reference.
		super_struct: ObjectRef,
		/// Tagged properties of the class object itself.
		#[serde(default)]
		properties: Vec<PropertyTag>,
	},
	/// Any other object with tagged properties.
	Object {
		/// Tagged properties.
		#[serde(default)]
		properties: Vec<PropertyTag>,
	},
}

/// One string table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringTableEntry {
	/// Entry key.
	pub key: String,
	/// Source string.
	pub value: String,
	/// Metadata pairs in stored order.
	#[serde(default)]
	pub metadata: Vec<(String, String)>,
}

/// One data table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTableRow {
	/// Row name.
	pub name: String,
	/// Row fields.
	#[serde(default)]
	pub fields: Vec<PropertyTag>,
}

/// Object flags bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectFlags(pub u32);

const FLAG_NAMES: &[(u32, &str)] = &[
	(0x0000_0001, "RF_Public"),
	(0x0000_0002, "RF_Standalone"),
	(0x0000_0004, "RF_MarkAsNative"),
	(0x0000_0008, "RF_Transactional"),
	(0x0000_0010, "RF_ClassDefaultObject"),
	(0x0000_0020, "RF_ArchetypeObject"),
	(0x0000_0040, "RF_Transient"),
	(0x0000_0080, "RF_MarkAsRootSet"),
	(0x0000_0100, "RF_TagGarbageTemp"),
	(0x0000_0200, "RF_NeedInitialization"),
	(0x0000_0400, "RF_NeedLoad"),
	(0x0000_0800, "RF_KeepForCooker"),
	(0x0000_1000, "RF_NeedPostLoad"),
	(0x0000_2000, "RF_NeedPostLoadSubobjects"),
	(0x0000_4000, "RF_NewerVersionExists"),
	(0x0000_8000, "RF_BeginDestroyed"),
	(0x0001_0000, "RF_FinishDestroyed"),
	(0x0002_0000, "RF_BeingRegenerated"),
	(0x0004_0000, "RF_DefaultSubObject"),
	(0x0008_0000, "RF_WasLoaded"),
	(0x0010_0000, "RF_TextExportTransient"),
	(0x0020_0000, "RF_LoadCompleted"),
	(0x0040_0000, "RF_InheritableComponentTemplate"),
	(0x0080_0000, "RF_DuplicateTransient"),
	(0x0100_0000, "RF_StrongRefOnFrame"),
	(0x0200_0000, "RF_NonPIEDuplicateTransient"),
	(0x0400_0000, "RF_Dynamic"),
	(0x0800_0000, "RF_WillBeLoaded"),
	(0x1000_0000, "RF_HasExternalPackage"),
];

impl ObjectFlags {
	/// Marker promoting an export to the package's default export.
	pub const CLASS_DEFAULT_OBJECT: u32 = 0x10;

	/// Raw bits.
	pub fn bits(self) -> u32 {
		self.0
	}

	/// Whether the class-default-object marker is set.
	pub fn is_class_default(self) -> bool {
		self.0 & Self::CLASS_DEFAULT_OBJECT != 0
	}

	/// Comma-separated flag names; unnamed leftover bits render as their decimal value.
	pub fn describe(self) -> String {
		if self.0 == 0 {
			return "RF_NoFlags".to_owned();
		}

		let mut names: Vec<String> = Vec::new();
		let mut rest = self.0;
		for &(bit, name) in FLAG_NAMES {
			if self.0 & bit != 0 {
				names.push(name.to_owned());
				rest &= !bit;
			}
		}
		if rest != 0 {
			names.push(rest.to_string());
		}
		names.join(", ")
	}
}

#[cfg(test)]
mod tests {
	use super::ObjectFlags;

	#[test]
	fn describe_flags() {
		assert_eq!(ObjectFlags(0).describe(), "RF_NoFlags");
		assert_eq!(ObjectFlags(0x11).describe(), "RF_Public, RF_ClassDefaultObject");
		assert_eq!(ObjectFlags(0x8000_0001).describe(), "RF_Public, 2147483648");
		assert!(ObjectFlags(0x10).is_class_default());
		assert!(!ObjectFlags(0x1).is_class_default());
	}
}
