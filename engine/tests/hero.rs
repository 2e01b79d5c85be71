use engine::{
    Characteristic, CharacteristicSet, CharacteristicValue, Dice, EngineError, Hero, Item, ItemKind,
    Pool,
};

#[test]
fn new_hero_gets_starting_characteristics() {
    let hero = Hero::new("Rookie");
    let chars = &hero.characteristics;
    assert_eq!(chars.len(), Characteristic::ALL.len());
    assert_eq!(
        chars.get(Characteristic::Strength),
        Some(&CharacteristicValue::Formula("2d6".into()))
    );
    assert_eq!(chars.score(Characteristic::Endurance).unwrap(), 30);
    assert_eq!(chars.score(Characteristic::Ego).unwrap(), 11);
    assert_eq!(hero.combat.body, Pool::default());
}

#[test]
fn prepare_derived_fills_combat_and_xp() {
    let mut hero = Hero::new("Rookie");
    hero.xp.earned = 10.0;
    hero.xp.used = 3.5;
    hero.prepare_derived().unwrap();

    assert_eq!(hero.combat.body, Pool::full(10));
    assert_eq!(hero.combat.knockout, Pool::full(20));
    assert_eq!(hero.combat.endurance, Pool::full(30));
    assert_eq!(hero.combat.stunned, Some(10));
    assert_eq!(hero.combat.recovery, Some(10));
    assert_eq!(hero.combat.phases, 4);
    let defense = hero.combat.defense.as_ref().unwrap();
    assert_eq!(defense.ordinary.value, Some(10));
    assert_eq!(defense.resistant.value, Some(10));
    assert_eq!(defense.total.value, Some(10));
    assert_eq!(hero.xp.left, 6.5);
}

#[test]
fn strength_rolls_its_formula_as_an_effect_roll() {
    let hero = Hero::new("Rookie");
    let mut dice = Dice::from_scripted(vec![6, 1]);
    let res = hero
        .roll_characteristic(&mut dice, Characteristic::Strength)
        .unwrap();
    assert_eq!(res.raw_faces(), &[6, 1]);
    assert_eq!(res.effect_total(), 2);
    assert_eq!(res.conventional_total(), 7);
}

#[test]
fn numeric_characteristics_are_not_rollable() {
    let mut hero = Hero::new("Rookie");
    let mut dice = Dice::from_seed(1);
    assert!(matches!(
        hero.roll_characteristic(&mut dice, Characteristic::Body),
        Err(EngineError::InvalidArgument(_))
    ));

    hero.characteristics.remove(Characteristic::Presence);
    assert_eq!(
        hero.roll_characteristic(&mut dice, Characteristic::Presence)
            .unwrap_err(),
        EngineError::MissingCharacteristic(Characteristic::Presence)
    );
}

#[test]
fn characteristic_names_parse_case_insensitively() {
    assert_eq!("Strength".parse::<Characteristic>().unwrap(), Characteristic::Strength);
    assert_eq!(" ego ".parse::<Characteristic>().unwrap(), Characteristic::Ego);
    assert!("luck".parse::<Characteristic>().is_err());
    assert!(Characteristic::Presence.is_rolled());
    assert!(!Characteristic::Speed.is_rolled());
}

#[test]
fn situations_stay_off_chat() {
    let mut hero = Hero::new("Rookie");
    hero.items = vec![
        Item::new("Haymaker", ItemKind::Maneuver { off: Some(-1), def: Some(-2) }),
        Item::new("Bank Heist", ItemKind::Situation).with_description("Hostages upstairs"),
        Item::new("Streetwise", ItemKind::Skill),
    ];
    let names: Vec<&str> = hero.chat_items().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Haymaker", "Streetwise"]);
}

#[test]
fn hero_without_characteristics_gets_defaults_on_load() {
    let hero: Hero = serde_json::from_str(r#"{"name": "Blank"}"#).unwrap();
    assert_eq!(hero.characteristics.score(Characteristic::Knockout).unwrap(), 20);
    assert!(hero.combat.defense.is_some());
}

#[test]
fn characteristic_details_survive_value_changes() {
    let json = r#"{"strength": {"value": "4d6", "details": "Servo arms"}, "body": 12}"#;
    let mut chars: CharacteristicSet = serde_json::from_str(json).unwrap();
    assert_eq!(chars.formula(Characteristic::Strength).unwrap().to_string(), "4d6");
    assert_eq!(chars.details(Characteristic::Strength), Some("Servo arms"));

    chars.set(Characteristic::Strength, "5d6");
    assert_eq!(chars.details(Characteristic::Strength), Some("Servo arms"));
    chars.set_details(Characteristic::Body, "Tough hide").unwrap();
    assert!(matches!(
        chars.set_details(Characteristic::Ego, "Stubborn"),
        Err(EngineError::MissingCharacteristic(Characteristic::Ego))
    ));

    chars.set_details(Characteristic::Strength, "").unwrap();
    assert_eq!(
        serde_json::to_string(&chars).unwrap(),
        r#"{"strength":"5d6","body":{"value":12,"details":"Tough hide"}}"#
    );
}
