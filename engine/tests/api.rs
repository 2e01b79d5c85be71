use engine::api::{load_hero_file, load_sheet, parse_hero, SheetConfig, SheetFormat};
use engine::{Characteristic, Dice, ItemKind, Pool};

#[test]
fn builtin_sample_hero_resolves() {
    let hero = load_sheet(SheetConfig {
        hero_id: Some("sample_hero".into()),
        ..SheetConfig::default()
    })
    .unwrap();

    assert_eq!(hero.name, "Sentinel");
    assert_eq!(hero.combat.body, Pool::new(9, 12));
    assert_eq!(hero.combat.knockout, Pool::full(24));
    assert_eq!(hero.combat.endurance, Pool::full(30));
    assert_eq!(hero.combat.stunned, Some(11));
    assert_eq!(hero.combat.recovery, Some(8));
    assert_eq!(hero.combat.initiative.as_deref(), Some("14 / 13"));
    let defense = hero.combat.defense.as_ref().unwrap();
    assert_eq!(defense.ordinary.value, Some(12));
    assert_eq!(defense.ordinary.notes, "Reinforced suit");
    assert_eq!(defense.resistant.value, Some(10));
    assert_eq!(defense.total.value, Some(14));
    assert_eq!(hero.xp.left, 7.0);
    assert_eq!(
        hero.characteristics.details(Characteristic::Strength),
        Some("Hard-light gauntlets")
    );
    assert_eq!(hero.characteristics.details(Characteristic::Body), Some(""));

    let phases = hero.combat.phase_schedule().unwrap();
    assert_eq!(phases.active_slots().collect::<Vec<_>>(), vec![1, 3, 5]);

    assert!(matches!(hero.items[1].kind, ItemKind::Power { end: Some(4) }));
}

#[test]
fn unresolved_load_keeps_fields_unset() {
    let hero = load_sheet(SheetConfig {
        hero_id: Some("sample_hero".into()),
        resolve: false,
        ..SheetConfig::default()
    })
    .unwrap();
    assert_eq!(hero.combat.knockout, Pool::default());
}

#[test]
fn yaml_sheet_from_disk() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("content/heroes/brick.yaml");
    let hero = load_sheet(SheetConfig {
        hero_path: Some(path.to_string_lossy().into_owned()),
        ..SheetConfig::default()
    })
    .expect("brick loads");

    assert_eq!(hero.name, "Bulwark");
    assert_eq!(hero.combat.endurance, Pool::full(35));
    assert_eq!(hero.combat.body, Pool::full(15));
    assert_eq!(hero.combat.phases, 36);
    assert!(hero.combat.defense.is_none());
    assert_eq!(hero.xp.left, 0.0);

    let res = hero
        .roll_characteristic(&mut Dice::from_seed(9), Characteristic::Strength)
        .unwrap();
    assert_eq!(res.raw_faces().len(), 5);
}

#[test]
fn config_errors_are_reported() {
    assert!(load_sheet(SheetConfig::default()).is_err());
    assert!(load_sheet(SheetConfig {
        hero_id: Some("nobody".into()),
        ..SheetConfig::default()
    })
    .is_err());
    assert!(load_sheet(SheetConfig {
        hero_path: Some("/definitely/not/here.json".into()),
        ..SheetConfig::default()
    })
    .is_err());
}

#[test]
fn missing_characteristic_message() {
    let yaml = "name: Glass\ncharacteristics:\n  body: 8\n";
    let mut hero = parse_hero(yaml, SheetFormat::Yaml).unwrap();
    let err = hero.prepare_derived().unwrap_err();
    assert_eq!(err.to_string(), "missing characteristic: knockout");
}

#[test]
fn sheet_format_follows_the_extension() {
    use std::path::Path;
    assert_eq!(SheetFormat::from_path(Path::new("a/hero.JSON")), SheetFormat::Json);
    assert_eq!(SheetFormat::from_path(Path::new("hero.yml")), SheetFormat::Yaml);
    assert_eq!(SheetFormat::from_path(Path::new("hero")), SheetFormat::Yaml);
}

#[test]
fn byte_order_marked_sheets_load() {
    let dir = tempfile::tempdir().unwrap();

    let utf8 = dir.path().join("bom.json");
    std::fs::write(&utf8, b"\xEF\xBB\xBF{\"name\":\"Bom\"}").unwrap();
    let hero = load_sheet(SheetConfig {
        hero_path: Some(utf8.to_string_lossy().into_owned()),
        ..SheetConfig::default()
    })
    .unwrap();
    assert_eq!(hero.name, "Bom");
    assert_eq!(hero.combat.body, Pool::full(10));

    let utf16 = dir.path().join("wide.yaml");
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend("name: Wide\n".encode_utf16().flat_map(u16::to_le_bytes));
    std::fs::write(&utf16, bytes).unwrap();
    let hero = load_hero_file(&utf16).unwrap();
    assert_eq!(hero.name, "Wide");
}
