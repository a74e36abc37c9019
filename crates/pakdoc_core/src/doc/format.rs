/// Decimal rendering rules for float-to-text coercion.
///
/// The default keeps at least one and at most eight fractional digits, so
/// `2.0` renders as `"2.0"` and `0.1f32` as `"0.1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatFormat {
	/// Fractional digits always kept, padding with zeros.
	pub min_decimals: u8,
	/// Fractional digits kept at most, rounding the remainder.
	pub max_decimals: u8,
}

impl Default for FloatFormat {
	fn default() -> Self {
		Self {
			min_decimals: 1,
			max_decimals: 8,
		}
	}
}

impl FloatFormat {
	/// Format with exactly `decimals` fractional digits.
	pub fn fixed(decimals: u8) -> Self {
		Self {
			min_decimals: decimals,
			max_decimals: decimals,
		}
	}

	/// Render one float.
	pub fn render(self, value: f64) -> String {
		if !value.is_finite() {
			return value.to_string();
		}

		let max = usize::from(self.max_decimals.max(self.min_decimals));
		let min = usize::from(self.min_decimals);
		let mut out = format!("{value:.max$}");

		if let Some(dot) = out.find('.') {
			let mut keep = out.len();
			while keep > dot + 1 + min && out.as_bytes()[keep - 1] == b'0' {
				keep -= 1;
			}
			if keep == dot + 1 {
				keep = dot;
			}
			out.truncate(keep);
		}

		// -0.0 and values that round to zero lose their sign
		if out.starts_with('-') && out[1..].bytes().all(|byte| byte == b'0' || byte == b'.') {
			out.remove(0);
		}

		out
	}
}
