use serde_json::json;

use crate::doc::{
	DocError, DocumentStore, MemoryArchive, PackageRecord, StopMode, StoreOptions, StoreStats, split_object_path,
};

/// Package `/Game/<name>` with a `<name>_C` class export pointing at `parent`
/// and a default object export holding `fields` as `Int` properties.
fn blueprint(name: &str, parent: Option<&str>, fields: &[(&str, i64)]) -> PackageRecord {
	let super_struct = match parent {
		Some(parent) => json!({
			"index": -2,
			"resolved": {"name": format!("{parent}_C"), "package": format!("/Game/{parent}")}
		}),
		None => json!({"index": 0}),
	};
	let properties: Vec<serde_json::Value> = fields
		.iter()
		.map(|(field, value)| json!({"name": field, "value": {"type": "Int", "value": value}}))
		.collect();

	serde_json::from_value(json!({
		"path": format!("/Game/{name}"),
		"exports": [
			{"name": format!("{name}_C"), "body": {"kind": "BlueprintClass", "super_struct": super_struct}},
			{"name": format!("Default__{name}_C"), "flags": 0x11, "body": {"kind": "Object", "properties": properties}}
		]
	}))
	.expect("blueprint json")
}

fn plain(name: &str, fields: &[(&str, i64)]) -> PackageRecord {
	let properties: Vec<serde_json::Value> = fields
		.iter()
		.map(|(field, value)| json!({"name": field, "value": {"type": "Int", "value": value}}))
		.collect();
	serde_json::from_value(json!({
		"path": format!("/Game/{name}"),
		"exports": [{"name": name, "body": {"kind": "Object", "properties": properties}}]
	}))
	.expect("plain json")
}

/// D1 -> D2 -> D3, where D3 has no class export.
fn chain() -> MemoryArchive {
	let mut archive = MemoryArchive::new();
	archive.insert_package(blueprint("D1", Some("D2"), &[("Own", 1)]));
	archive.insert_package(blueprint("D2", Some("D3"), &[("Middle", 2)]));
	archive.insert_package(plain("D3", &[("field", 3), ("other", 4)]));
	archive
}

mod loading {
	use super::*;

	#[test]
	fn cache_serves_repeat_lookups() {
		let mut store = DocumentStore::new(chain());

		let first = store.get_document("/Game/D1", true).expect("load").expect("present");
		let second = store.get_document("/Game/D1.D1_C", true).expect("load").expect("present");
		assert!(std::rc::Rc::ptr_eq(&first, &second));
		assert_eq!(store.archive().load_count("/Game/D1"), 1);
		assert!(store.is_cached("/Game/D1.Anything"));
		assert_eq!(store.stats(), StoreStats { archive_loads: 1, cache_hits: 1, misses: 0 });
	}

	#[test]
	fn uncached_loads_do_not_populate() {
		let mut store = DocumentStore::new(chain());
		store.get_document("/Game/D1", false).expect("load");
		store.get_document("/Game/D1", false).expect("load");
		assert_eq!(store.archive().load_count("/Game/D1"), 2);
		assert!(!store.is_cached("/Game/D1"));

		let mut store = DocumentStore::with_options(chain(), StoreOptions::uncached());
		store.get_document("/Game/D1", true).expect("load");
		assert_eq!(store.cached_len(), 0);
	}

	#[test]
	fn clear_cache_forces_reload() {
		let mut store = DocumentStore::new(chain());
		store.get_document("/Game/D2", true).expect("load");
		store.clear_cache();
		assert!(!store.is_cached("/Game/D2"));
		store.get_document("/Game/D2", true).expect("load");
		assert_eq!(store.archive().load_count("/Game/D2"), 2);
	}

	#[test]
	fn missing_document_is_none() {
		let mut store = DocumentStore::new(chain());
		assert!(store.get_document("/Game/Nope", true).expect("miss is not an error").is_none());
		assert!(store.get_document("", true).expect("empty path").is_none());
		assert_eq!(store.stats().misses, 1);
		assert!(store.last_archive_error().is_none());
	}

	#[test]
	fn archive_errors_fold_into_none() {
		let mut archive = chain();
		archive.insert_raw("/Game/Corrupt", b"\x00\x01garbage".to_vec());
		let mut store = DocumentStore::new(archive);

		assert!(store.get_document("/Game/Corrupt", true).expect("folded").is_none());
		assert!(matches!(store.last_archive_error(), Some(DocError::UnknownMagic { .. })));
		assert!(store.get_document("/Game/D3", true).expect("load").is_some());
	}

	#[test]
	fn adapter_faults_propagate() {
		let mut archive = MemoryArchive::new();
		archive.insert_raw(
			"/Game/Faulty",
			br#"{"exports": [{"name": "Faulty", "body": {"kind": "Object", "properties": [
				{"name": "X", "value": {"type": "Interface"}}
			]}}]}"#
				.to_vec(),
		);
		let mut store = DocumentStore::new(archive);

		let err = store.get_document("/Game/Faulty", true).expect_err("fault");
		assert!(err.is_fault());
		assert!(!store.is_cached("/Game/Faulty"));
	}

	#[test]
	fn unknown_text_history_propagates() {
		let mut archive = MemoryArchive::new();
		archive.insert_raw(
			"/Game/Labels",
			br#"{"exports": [{"name": "Labels", "body": {"kind": "Object", "properties": [
				{"name": "Title", "tag_type": "TextProperty", "value": {"type": "Text", "history": {"kind": "Bogus"}}}
			]}}]}"#
				.to_vec(),
		);
		let mut store = DocumentStore::new(archive);

		let err = store.get_document("/Game/Labels", true).expect_err("fault");
		assert!(matches!(err, DocError::UnsupportedTextHistory { ref name, .. } if name == "Title"));
		assert!(store.last_archive_error().is_none());
	}
}

mod exports {
	use super::*;

	#[test]
	fn suffix_names_the_export() {
		let mut store = DocumentStore::new(chain());

		let class = store.get_export("/Game/D1.D1_C", None).expect("load").expect("export");
		assert_eq!(class.get().name(), "D1_C");

		let default = store.get_export("/Game/D1", None).expect("load").expect("export");
		assert_eq!(default.get().name(), "Default__D1_C");

		let explicit = store.get_export("/Game/D1.D1_C", Some("Default__D1_C")).expect("load").expect("export");
		assert_eq!(explicit.get().name(), "Default__D1_C");

		assert!(store.get_export("/Game/D1.Missing", None).expect("load").is_none());
	}

	#[test]
	fn export_data_unwraps_data_node() {
		let mut store = DocumentStore::new(chain());
		let data = store.get_export_data("/Game/D3", None).expect("load").expect("data");
		assert_eq!(data.get().name(), "Data");
		assert_eq!(data.get().int_or_default("field"), 3);
		assert_eq!(data.export().map(|export| export.name()), Some("D3"));
		assert_eq!(data.document().name(), "D3");
	}
}

mod inheritance {
	use super::*;

	#[test]
	fn chain_resolves_on_the_last_document() {
		let mut store = DocumentStore::new(chain());
		let d1 = store.get_document("/Game/D1", true).expect("load").expect("present");

		let found = store.find_inheritable(&d1, None, "field").expect("walk").expect("found on D3");
		assert_eq!(found.get().value().int(), 3);
		assert_eq!(found.document().name(), "D3");

		let middle = store.find_inheritable(&d1, None, "Middle").expect("walk").expect("found on D2");
		assert_eq!(middle.get().value().int(), 2);
		let own = store.find_inheritable(&d1, None, "Own").expect("walk").expect("found on D1");
		assert_eq!(own.document().name(), "D1");
	}

	#[test]
	fn each_document_loads_once_across_lookups() {
		let mut store = DocumentStore::new(chain());
		let d1 = store.get_document("/Game/D1", true).expect("load").expect("present");

		for field in ["field", "other", "Middle", "field", "missing"] {
			store.find_inheritable(&d1, None, field).expect("walk");
		}
		for path in ["/Game/D1", "/Game/D2", "/Game/D3"] {
			assert_eq!(store.archive().load_count(path), 1, "{path}");
		}
	}

	#[test]
	fn exhausted_chain_is_none() {
		let mut store = DocumentStore::new(chain());
		let d1 = store.get_document("/Game/D1", true).expect("load").expect("present");
		assert!(store.find_inheritable(&d1, None, "Nowhere").expect("walk").is_none());
	}

	#[test]
	fn missing_parent_document_ends_the_walk() {
		let mut archive = MemoryArchive::new();
		archive.insert_package(blueprint("Orphan", Some("Gone"), &[]));
		let mut store = DocumentStore::new(archive);
		let orphan = store.get_document("/Game/Orphan", true).expect("load").expect("present");

		assert!(store.find_inheritable(&orphan, None, "X").expect("walk").is_none());
		assert_eq!(store.archive().load_count("/Game/Gone"), 1);
	}

	#[test]
	fn unresolved_parent_reference_ends_the_walk() {
		let mut archive = MemoryArchive::new();
		archive.insert_package(blueprint("Root", None, &[("A", 1)]));
		let mut store = DocumentStore::new(archive);
		let root = store.get_document("/Game/Root", true).expect("load").expect("present");

		assert!(store.find_inheritable(&root, None, "B").expect("walk").is_none());
		assert_eq!(store.archive().total_loads(), 1);
	}

	#[test]
	fn cycles_fault_or_stop_by_policy() {
		let mut archive = MemoryArchive::new();
		archive.insert_package(blueprint("Ping", Some("Pong"), &[]));
		archive.insert_package(blueprint("Pong", Some("Ping"), &[]));

		let mut store = DocumentStore::new(archive);
		let ping = store.get_document("/Game/Ping", true).expect("load").expect("present");
		let err = store.find_inheritable(&ping, None, "X").expect_err("cycle");
		assert!(matches!(err, DocError::InheritanceCycle { ref path } if path == "/Game/Ping"));
		assert!(err.is_fault());

		let mut archive = MemoryArchive::new();
		archive.insert_package(blueprint("Ping", Some("Pong"), &[]));
		archive.insert_package(blueprint("Pong", Some("Ping"), &[]));
		let options = StoreOptions {
			on_cycle: StopMode::Stop,
			..StoreOptions::default()
		};
		let mut store = DocumentStore::with_options(archive, options);
		let ping = store.get_document("/Game/Ping", true).expect("load").expect("present");
		assert!(store.find_inheritable(&ping, None, "X").expect("stop mode").is_none());
	}

	#[test]
	fn depth_cap_applies() {
		let mut archive = MemoryArchive::new();
		archive.insert_package(blueprint("L0", Some("L1"), &[]));
		archive.insert_package(blueprint("L1", Some("L2"), &[]));
		archive.insert_package(blueprint("L2", Some("L3"), &[]));
		archive.insert_package(plain("L3", &[("deep", 9)]));

		let options = StoreOptions {
			max_inheritance_depth: 2,
			..StoreOptions::default()
		};
		let mut store = DocumentStore::with_options(archive, options);
		let l0 = store.get_document("/Game/L0", true).expect("load").expect("present");
		let err = store.find_inheritable(&l0, None, "deep").expect_err("too deep");
		assert!(matches!(err, DocError::InheritanceDepthExceeded { max_depth: 2 }));

		let reachable = store.find_inheritable(&l0, None, "Missing").expect_err("still too deep");
		assert!(reachable.is_fault());
	}
}

#[test]
fn object_path_splitting() {
	assert_eq!(split_object_path("/Game/A/Pkg.Export"), ("/Game/A/Pkg", Some("Export")));
	assert_eq!(split_object_path("/Game/A/Pkg"), ("/Game/A/Pkg", None));
	assert_eq!(split_object_path("/Game/A.B/Pkg"), ("/Game/A.B/Pkg", None));
	assert_eq!(split_object_path(" /Game/Pkg. "), ("/Game/Pkg", None));
	assert_eq!(split_object_path("Pkg.Obj.Sub"), ("Pkg", Some("Obj.Sub")));
}
