use std::io::Write;

use crate::doc::{DocError, NodeRef, Result};

/// Consumer of tabular rows; one row is an ordered list of `(column, cell)` pairs.
pub trait RowSink {
	/// Accept one row.
	fn write_row(&mut self, row: &[(String, String)]) -> Result<()>;
}

/// Sink collecting rows in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
	/// Rows in arrival order.
	pub rows: Vec<Vec<(String, String)>>,
}

impl MemorySink {
	/// Cell of `column` in row `index`.
	pub fn cell(&self, index: usize, column: &str) -> Option<&str> {
		let row = self.rows.get(index)?;
		row.iter().find(|(name, _)| name == column).map(|(_, cell)| cell.as_str())
	}
}

impl RowSink for MemorySink {
	fn write_row(&mut self, row: &[(String, String)]) -> Result<()> {
		self.rows.push(row.to_vec());
		Ok(())
	}
}

/// Tab-separated writer over a `csv` writer.
///
/// The header is taken from the first row. Later rows are written in header
/// order; cells for columns the header lacks are dropped and missing cells
/// are left empty. Cells holding tabs, quotes or line breaks are quoted.
#[derive(Debug)]
pub struct TsvSink<W: Write> {
	out: csv::Writer<W>,
	header: Option<Vec<String>>,
}

impl<W: Write> TsvSink<W> {
	/// Wrap a writer.
	pub fn new(out: W) -> Self {
		Self {
			out: csv::WriterBuilder::new().delimiter(b'\t').from_writer(out),
			header: None,
		}
	}

	/// Column names, once the first row was written.
	pub fn header(&self) -> Option<&[String]> {
		self.header.as_deref()
	}

	/// Flush and return the writer.
	pub fn into_inner(self) -> Result<W> {
		self.out.into_inner().map_err(|err| DocError::Io(err.into_error()))
	}
}

impl<W: Write> RowSink for TsvSink<W> {
	fn write_row(&mut self, row: &[(String, String)]) -> Result<()> {
		if self.header.is_none() {
			let header: Vec<String> = row.iter().map(|(column, _)| column.clone()).collect();
			self.out.write_record(&header)?;
			self.header = Some(header);
		}
		let Some(header) = &self.header else {
			return Ok(());
		};

		let cells = header
			.iter()
			.map(|column| row.iter().find(|(name, _)| name == column).map_or("", |(_, cell)| cell.as_str()));
		self.out.write_record(cells)?;
		Ok(())
	}
}

/// Emit one row per child of a table-like node.
///
/// Columns are `Name` (the child key) followed by the child's own children in
/// sorted key order, each rendered as text. Returns the number of rows written.
pub fn write_rows(table: NodeRef<'_>, sink: &mut dyn RowSink) -> Result<usize> {
	let mut written = 0;
	for (key, row) in table.child_names().zip(table.children()) {
		let mut cells = vec![("Name".to_owned(), key.to_owned())];
		for column in row.sorted_child_names() {
			let text = row.child(column).map(|cell| cell.as_text()).unwrap_or_default();
			cells.push((column.to_owned(), text));
		}
		sink.write_row(&cells)?;
		written += 1;
	}
	Ok(written)
}

#[cfg(test)]
mod tests;
