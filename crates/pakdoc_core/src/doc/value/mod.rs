use std::any::Any;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use crate::doc::FloatFormat;

/// Externally owned object stored behind a scalar slot.
///
/// Opaque values take part in coercion only through their `Display` rendering.
pub trait OpaqueObject: fmt::Debug + fmt::Display {
	/// Downcasting hook.
	fn as_any(&self) -> &dyn Any;
}

/// Active representation tag of a [`ScalarValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
	/// Nothing stored yet.
	#[default]
	None,
	/// Signed integer.
	Int,
	/// Unsigned integer.
	UInt,
	/// Floating point.
	Float,
	/// Text.
	Text,
	/// External object.
	Opaque,
}

impl ValueKind {
	/// Stable label for diagnostics.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "None",
			Self::Int => "Int",
			Self::UInt => "UInt",
			Self::Float => "Float",
			Self::Text => "Text",
			Self::Opaque => "Opaque",
		}
	}
}

/// Owned copy of whatever a scalar slot holds, as returned by [`ScalarValue::opaque`].
#[derive(Debug, Clone)]
pub enum HeldValue {
	/// Signed integer.
	Int(i64),
	/// Unsigned integer.
	UInt(u64),
	/// Floating point.
	Float(f64),
	/// Text.
	Text(String),
	/// External object.
	Opaque(Rc<dyn OpaqueObject>),
}

/// Single value slot with lazily cached coercions.
///
/// Exactly one representation is active at a time and is chosen by the last
/// setter. Reading any other representation coerces on first access and
/// caches the result until the next write. Reads never fail: an unparsable
/// or absent source yields the representation's zero value.
#[derive(Debug, Clone, Default)]
pub struct ScalarValue {
	kind: ValueKind,
	format: FloatFormat,
	int: OnceCell<i64>,
	uint: OnceCell<u64>,
	float: OnceCell<f64>,
	text: OnceCell<String>,
	opaque: Option<Rc<dyn OpaqueObject>>,
}

impl ScalarValue {
	/// Empty value using the default float format.
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty value rendering floats with `format`.
	pub fn with_format(format: FloatFormat) -> Self {
		Self {
			format,
			..Self::default()
		}
	}

	/// Active representation tag.
	pub fn kind(&self) -> ValueKind {
		self.kind
	}

	/// Whether nothing has been stored.
	pub fn is_none(&self) -> bool {
		self.kind == ValueKind::None
	}

	/// Float format used for float-to-text coercion.
	pub fn format(&self) -> FloatFormat {
		self.format
	}

	/// Replace the float format, dropping a cached text rendering of a float.
	pub fn set_format(&mut self, format: FloatFormat) {
		self.format = format;
		if self.kind == ValueKind::Float {
			self.text = OnceCell::new();
		}
	}

	/// Store a signed integer.
	pub fn set_int(&mut self, value: i64) {
		self.reset(ValueKind::Int);
		self.int = OnceCell::from(value);
	}

	/// Store an unsigned integer.
	pub fn set_uint(&mut self, value: u64) {
		self.reset(ValueKind::UInt);
		self.uint = OnceCell::from(value);
	}

	/// Store a float.
	pub fn set_float(&mut self, value: f64) {
		self.reset(ValueKind::Float);
		self.float = OnceCell::from(value);
	}

	/// Store text.
	pub fn set_text(&mut self, value: impl Into<String>) {
		self.reset(ValueKind::Text);
		self.text = OnceCell::from(value.into());
	}

	/// Store an external object.
	pub fn set_opaque(&mut self, value: Rc<dyn OpaqueObject>) {
		self.reset(ValueKind::Opaque);
		self.opaque = Some(value);
	}

	/// Clear back to the untouched state.
	pub fn clear(&mut self) {
		self.reset(ValueKind::None);
	}

	/// Value as a signed integer.
	pub fn int(&self) -> i64 {
		*self.int.get_or_init(|| match self.kind {
			ValueKind::UInt => self.uint.get().map_or(0, |value| *value as i64),
			ValueKind::Float => self.float.get().map_or(0, |value| *value as i64),
			ValueKind::Text | ValueKind::Opaque => self.text().trim().parse().unwrap_or_default(),
			ValueKind::Int | ValueKind::None => 0,
		})
	}

	/// Value as an unsigned integer.
	pub fn uint(&self) -> u64 {
		*self.uint.get_or_init(|| match self.kind {
			ValueKind::Int => self.int.get().map_or(0, |value| *value as u64),
			ValueKind::Float => self.float.get().map_or(0, |value| *value as u64),
			ValueKind::Text | ValueKind::Opaque => self.text().trim().parse().unwrap_or_default(),
			ValueKind::UInt | ValueKind::None => 0,
		})
	}

	/// Value as a float.
	pub fn float(&self) -> f64 {
		*self.float.get_or_init(|| match self.kind {
			ValueKind::Int => self.int.get().map_or(0.0, |value| *value as f64),
			ValueKind::UInt => self.uint.get().map_or(0.0, |value| *value as f64),
			ValueKind::Text | ValueKind::Opaque => self.text().trim().parse().unwrap_or_default(),
			ValueKind::Float | ValueKind::None => 0.0,
		})
	}

	/// Value as text; empty for an untouched value.
	pub fn text(&self) -> &str {
		self.text.get_or_init(|| match self.kind {
			ValueKind::Int => self.int.get().map(i64::to_string).unwrap_or_default(),
			ValueKind::UInt => self.uint.get().map(u64::to_string).unwrap_or_default(),
			ValueKind::Float => self.float.get().map(|value| self.format.render(*value)).unwrap_or_default(),
			ValueKind::Opaque => self.opaque.as_ref().map(|value| value.to_string()).unwrap_or_default(),
			ValueKind::Text | ValueKind::None => String::new(),
		})
	}

	/// Held value in its active representation; `None` only for an untouched value.
	pub fn opaque(&self) -> Option<HeldValue> {
		match self.kind {
			ValueKind::None => None,
			ValueKind::Int => Some(HeldValue::Int(self.int())),
			ValueKind::UInt => Some(HeldValue::UInt(self.uint())),
			ValueKind::Float => Some(HeldValue::Float(self.float())),
			ValueKind::Text => Some(HeldValue::Text(self.text().to_owned())),
			ValueKind::Opaque => self.opaque.clone().map(HeldValue::Opaque),
		}
	}

	/// Borrow the stored external object as `T` when it is one.
	pub fn downcast_opaque<T: 'static>(&self) -> Option<&T> {
		self.opaque.as_deref()?.as_any().downcast_ref::<T>()
	}

	fn reset(&mut self, kind: ValueKind) {
		self.kind = kind;
		self.int = OnceCell::new();
		self.uint = OnceCell::new();
		self.float = OnceCell::new();
		self.text = OnceCell::new();
		self.opaque = None;
	}
}

impl fmt::Display for ScalarValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.text())
	}
}
