use crate::doc::{MemorySink, RowSink, TsvSink, Tree, write_rows};

fn recipes() -> (Tree, crate::doc::NodeId) {
	let mut tree = Tree::new();
	let table = tree.create("Data", "DataTable");
	for (name, count, time) in [("Plank", 4, 2.5), ("Nails", 10, 1.0)] {
		let row = tree.create(name, "RecipeRow");
		let time = tree.create_float("Time", "Float", time);
		tree.add(row, time);
		let count = tree.create_int("Count", "Int", count);
		tree.add(row, count);
		tree.add(table, row);
	}
	(tree, table)
}

#[test]
fn rows_follow_children_with_sorted_columns() {
	let (tree, table) = recipes();
	let mut sink = MemorySink::default();

	let written = write_rows(tree.node(table), &mut sink).expect("write rows");
	assert_eq!(written, 2);
	assert_eq!(sink.rows[0].iter().map(|(column, _)| column.as_str()).collect::<Vec<_>>(), vec!["Name", "Count", "Time"]);
	assert_eq!(sink.cell(0, "Name"), Some("Plank"));
	assert_eq!(sink.cell(1, "Count"), Some("10"));
	assert_eq!(sink.cell(1, "Time"), Some("1.0"));
	assert_eq!(sink.cell(2, "Name"), None);
}

#[test]
fn tsv_header_from_first_row() {
	let (tree, table) = recipes();
	let mut sink = TsvSink::new(Vec::new());
	write_rows(tree.node(table), &mut sink).expect("write rows");

	assert_eq!(sink.header().map(<[String]>::len), Some(3));
	let text = String::from_utf8(sink.into_inner().expect("flush")).expect("utf8");
	assert_eq!(text, "Name\tCount\tTime\nPlank\t4\t2.5\nNails\t10\t1.0\n");
}

#[test]
fn tsv_quotes_and_aligns_cells() {
	let mut sink = TsvSink::new(Vec::new());
	sink.write_row(&[("A".into(), "x".into()), ("B".into(), "y".into())]).expect("first row");
	sink.write_row(&[("B".into(), "tab\there".into()), ("C".into(), "dropped".into())]).expect("second row");
	sink.write_row(&[("A".into(), "line\nbreak".into())]).expect("third row");

	let text = String::from_utf8(sink.into_inner().expect("flush")).expect("utf8");
	assert_eq!(text, "A\tB\nx\ty\n\t\"tab\there\"\n\"line\nbreak\"\t\n");
}

#[test]
fn empty_table_writes_nothing() {
	let mut tree = Tree::new();
	let table = tree.create("Data", "DataTable");
	let mut sink = TsvSink::new(Vec::new());
	assert_eq!(write_rows(tree.node(table), &mut sink).expect("write rows"), 0);
	assert!(sink.header().is_none());
	assert!(sink.into_inner().expect("flush").is_empty());
}
