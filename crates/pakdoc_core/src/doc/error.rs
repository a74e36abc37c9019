use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, DocError>;

/// Errors produced while loading packages and materializing document trees.
///
/// Variants split into two classes. Archive failures describe a package that
/// could not be read; the document store folds them into "not found". Faults
/// describe input the adapter has no safe interpretation for and must abort
/// the document being built. See [`DocError::is_fault`].
#[derive(Debug, Error)]
pub enum DocError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Package record bytes were not a valid JSON record.
	#[error("malformed package record: {0}")]
	Json(#[from] serde_json::Error),
	/// Tabular output could not be written.
	#[error("row output: {0}")]
	Csv(#[from] csv::Error),
	/// Leading bytes matched neither a zstd frame nor a JSON document.
	#[error("unsupported compression or not a package record (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Directory archive root does not exist or is not a directory.
	#[error("archive root not found: {root}")]
	MountRootMissing {
		/// Requested mount root.
		root: String,
	},
	/// Property shape outside the set the adapter understands.
	#[error("unrecognized property shape for {name:?} (declared {declared_type:?})")]
	UnrecognizedProperty {
		/// Name of the node being adapted.
		name: String,
		/// Declared external type of the property.
		declared_type: String,
	},
	/// Array property whose element type could not be determined.
	#[error("array {name:?} has no determinable element type")]
	ArrayElementType {
		/// Name of the array node.
		name: String,
	},
	/// Rich text history kind with no known field layout.
	#[error("unsupported text history {kind} on {name:?}")]
	UnsupportedTextHistory {
		/// Name of the text node.
		name: String,
		/// History kind label.
		kind: &'static str,
	},
	/// Inheritance chain revisited a document.
	#[error("inheritance cycle detected at {path}")]
	InheritanceCycle {
		/// Document path seen twice.
		path: String,
	},
	/// Inheritance chain exceeded the configured hop budget.
	#[error("inheritance depth exceeded (max={max_depth})")]
	InheritanceDepthExceeded {
		/// Configured depth ceiling.
		max_depth: usize,
	},
}

impl DocError {
	/// Whether this error is an internal-consistency fault rather than an archive failure.
	pub fn is_fault(&self) -> bool {
		matches!(
			self,
			Self::UnrecognizedProperty { .. }
				| Self::ArrayElementType { .. }
				| Self::UnsupportedTextHistory { .. }
				| Self::InheritanceCycle { .. }
				| Self::InheritanceDepthExceeded { .. }
		)
	}
}
