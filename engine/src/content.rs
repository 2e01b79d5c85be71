use std::collections::HashMap;

pub fn builtin_heroes() -> HashMap<&'static str, &'static str> {
    HashMap::from([(
        "sample_hero",
        include_str!("../content/heroes/sample_hero.json"),
    )])
}
