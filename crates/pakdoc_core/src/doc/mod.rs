mod adapt;
mod archive;
mod document;
mod error;
mod format;
mod node;
mod path;
mod property;
mod record;
mod sink;
mod store;
mod value;

/// Property-to-node translation entry points.
pub use adapt::{adapt_fields, adapt_property, property_node};
/// Package sources and record decoding.
pub use archive::{Archive, Compression, DirArchive, MemoryArchive, MountOptions, ZSTD_MAGIC, decode_bytes, decode_record};
/// Materialized packages and export views.
pub use document::{Document, ExportKind, ExportRef};
/// Error and result aliases.
pub use error::{DocError, Result};
/// Float-to-text rendering rules.
pub use format::FloatFormat;
/// Tree arena and node views.
pub use node::{NodeId, NodeRef, NodeRole, Tree};
/// Dotted/bracketed path resolution.
pub use path::{PathResolver, PathSegment};
/// Decoder-side property model.
pub use property::{
	ArrayValue, Color, Guid, IntPoint, LinearColor, MapEntry, MapValue, NameValue, ObjectRef, Property, PropertyTag, Quat,
	RefKind, ResolvedObject, RichCurveKey, Rotator, SetValue, StructValue, TextHistory, TextValue, VariableWithOffset,
	Vector,
};
/// Decoder-side package and export records.
pub use record::{DataTableRow, ExportBody, ExportRecord, ObjectFlags, PackageRecord, StringTableEntry};
/// Tabular output.
pub use sink::{MemorySink, RowSink, TsvSink, write_rows};
/// Caching loader and inheritance resolution.
pub use store::{DocumentStore, NodeHandle, StopMode, StoreOptions, StoreStats, split_object_path};
/// Lazily coercing scalar slot.
pub use value::{HeldValue, OpaqueObject, ScalarValue, ValueKind};
