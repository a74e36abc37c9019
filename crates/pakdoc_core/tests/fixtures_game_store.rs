#![allow(missing_docs)]

use pakdoc::doc::{
	DirArchive, DocError, Document, DocumentStore, ExportKind, FloatFormat, MemorySink, MountOptions, ObjectRef, PackageRecord,
	TsvSink, write_rows,
};
use pakdoc_testkit::{fixture_game_root, fixture_json};

fn store() -> DocumentStore<DirArchive> {
	let archive = DirArchive::mount(fixture_game_root(), MountOptions::default()).expect("fixture game mounts");
	DocumentStore::new(archive)
}

#[test]
fn tags_array_reads_by_index() {
	let mut store = store();
	let data = store
		.get_export_data("/Game/Blueprints/BP_Sword", None)
		.expect("load")
		.expect("default export data");
	let data = data.get();

	let tags = data.get("Tags").expect("Tags field");
	assert_eq!(tags.count(), 2);
	assert!(tags.is_array());
	assert_eq!(tags.get("1").map(|tag| tag.value().text()), Some("Weapon.Tier2"));
	assert_eq!(data.text_or_default("Tags[0]"), "Weapon.Tier1");
	assert_eq!(data.text_or_default("Tags.1"), "Weapon.Tier2");
}

#[test]
fn sword_inherits_through_compressed_parent() {
	let mut store = store();
	let sword = store.get_document("/Game/Blueprints/BP_Sword", true).expect("load").expect("present");

	let damage = store.find_inheritable(&sword, None, "Damage").expect("walk").expect("own field");
	assert_eq!(damage.get().value().int(), 25);
	assert_eq!(damage.document().name(), "BP_Sword");

	let range = store.find_inheritable(&sword, None, "Stats.Range").expect("walk").expect("from BP_Weapon");
	assert_eq!(range.get().as_text(), "1.5");
	assert_eq!(range.document().name(), "BP_Weapon");
	assert_eq!(range.export().map(|export| export.name()), Some("Default__BP_Weapon_C"));

	let rarity = store.find_inheritable(&sword, None, "Rarity").expect("walk").expect("nearest override");
	assert_eq!(rarity.get().value().text(), "ERarity::Uncommon");

	let stack = store.find_inheritable(&sword, None, "MaxStack").expect("walk").expect("from BP_Base");
	assert_eq!(stack.get().value().int(), 99);
	assert_eq!(stack.document().path(), "/Game/Blueprints/BP_Base");

	let icon = store.find_inheritable(&sword, None, "Icon").expect("walk").expect("reference on BP_Base");
	assert_eq!(icon.get().text_or_default("ObjectClass"), "Engine.Texture2D");
	assert_eq!(
		icon.get().value().downcast_opaque::<ObjectRef>().and_then(ObjectRef::target_package),
		Some("/Game/UI/T_Generic")
	);

	assert!(store.find_inheritable(&sword, None, "Nonexistent").expect("walk").is_none());
	assert!(store.is_cached("/Game/Blueprints/BP_Weapon"));
	assert!(store.is_cached("/Game/Blueprints/BP_Base"));
	assert!(!store.is_cached("/Script/Engine"));
}

#[test]
fn repeated_walks_hit_the_cache() {
	let mut store = store();
	let sword = store.get_document("/Game/Blueprints/BP_Sword", true).expect("load").expect("present");

	store.find_inheritable(&sword, None, "MaxStack").expect("walk");
	let loads = store.stats().archive_loads;
	store.find_inheritable(&sword, None, "Weight").expect("walk");
	store.find_inheritable(&sword, None, "Stats.Speed").expect("walk");

	assert_eq!(store.stats().archive_loads, loads);
	assert_eq!(store.stats().cache_hits, 3);
}

#[test]
fn sword_text_and_color_fields() {
	let mut store = store();
	let data = store.get_export_data("/Game/Blueprints/BP_Sword", None).expect("load").expect("data");
	let data = data.get();

	assert_eq!(data.text_or_default("DisplayName"), "Iron Sword");
	assert_eq!(data.text_or_default("DisplayName.TableId"), "/Game/Text/ST_Items");
	assert_eq!(data.text_or_default("Tint"), "C81020FF");
	assert_eq!(data.uint_or_default("Tint.R"), 200);
}

#[test]
fn class_export_describes_parent() {
	let mut store = store();
	let class = store
		.get_export("/Game/Blueprints/BP_Sword.BP_Sword_C", None)
		.expect("load")
		.expect("class export");

	let export = class.export().expect("export view");
	assert_eq!(export.kind(), ExportKind::Blueprint);
	assert_eq!(class.get().text_or_default("SuperStruct.ObjectAsset"), "/Game/Blueprints/BP_Weapon");
	assert_eq!(class.get().text_or_default("FlagsDesc"), "RF_Public");
	assert_eq!(class.get().to_string(), "BP_Sword_C: Blueprint [0]");
}

#[test]
fn data_table_rows_to_sink() {
	let mut store = store();
	let data = store.get_export_data("/Game/Data/DT_Recipes", None).expect("load").expect("data");

	let mut sink = MemorySink::default();
	let written = write_rows(data.get(), &mut sink).expect("rows");
	assert_eq!(written, 2);
	assert_eq!(sink.cell(0, "Name"), Some("Plank"));
	assert_eq!(sink.cell(0, "Output"), Some("Item_Plank"));
	assert_eq!(sink.cell(0, "Time"), Some("2.5"));
	assert_eq!(sink.cell(1, "Note"), Some("needs\tforge"));
	assert_eq!(data.get().get("Nails").map(|row| row.type_tag()), Some("RecipeRow"));
}

#[test]
fn data_table_tsv_reads_back() {
	let mut store = store();
	let data = store.get_export_data("/Game/Data/DT_Recipes", None).expect("load").expect("data");

	let mut sink = TsvSink::new(Vec::new());
	write_rows(data.get(), &mut sink).expect("rows");
	let bytes = sink.into_inner().expect("flush");

	let mut reader = csv::ReaderBuilder::new().delimiter(b'\t').from_reader(bytes.as_slice());
	let header = reader.headers().expect("header").clone();
	let note = header.iter().position(|column| column == "Note").expect("Note column");
	let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().expect("records");
	assert_eq!(rows.len(), 2);
	assert_eq!(rows[1].get(0), Some("Nails"));
	assert_eq!(rows[1].get(note), Some("needs\tforge"));
	assert_eq!(rows[0].get(note), Some("dry"));
	let time = header.iter().position(|column| column == "Time").expect("Time column");
	assert_eq!(rows[1].get(time), Some(""));
}

#[test]
fn string_table_without_path_uses_lookup_path() {
	let mut store = store();
	let table = store.get_document("/Game/Text/ST_Items", true).expect("load").expect("present");

	assert_eq!(table.path(), "/Game/Text/ST_Items");
	assert_eq!(table.export(None).map(|export| export.kind()), Some(ExportKind::StringTable));
	assert_eq!(table.export_data(None).map(|data| data.text_or_default("SWORD.Context")), Some("weapon"));
}

#[test]
fn broken_record_folds_to_none() {
	let mut store = store();
	assert!(store.get_document("/Game/Data/Broken", true).expect("folded").is_none());
	assert!(matches!(store.last_archive_error(), Some(DocError::Json(_))));
	assert!(store.get_document("/Game/Data/Missing", true).expect("missing").is_none());
}

#[test]
fn faulty_record_is_a_fault() {
	let mut store = store();
	let err = store.get_document("/Game/Data/Faulty", true).expect_err("fault surfaces");
	assert!(matches!(
		err,
		DocError::UnrecognizedProperty { ref name, ref declared_type } if name == "OnUse" && declared_type == "MulticastDelegateProperty"
	));
}

#[test]
fn base_record_builds_without_a_store() {
	let record: PackageRecord = serde_json::from_value(fixture_json("game/Game/Blueprints/BP_Base.json")).expect("record");
	let document = Document::build(&record, FloatFormat::fixed(2)).expect("build");

	assert_eq!(document.name(), "BP_Base");
	assert_eq!(document.default_export().map(|export| export.name()), Some("Default__BP_Base_C"));
	let data = document.export_data(None).expect("default data");
	assert_eq!(data.text_or_default("Weight"), "1.00");
	assert_eq!(data.get("Icon").map(|icon| icon.type_tag()), Some("ObjectProperty"));
}
