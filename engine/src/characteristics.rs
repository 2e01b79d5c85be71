use std::fmt;
use std::str::FromStr;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{invalid, EngineError, Result};
use crate::formula::DiceFormula;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Characteristic {
    Strength,
    Presence,
    Body,
    Stunned,
    Recovery,
    Knockout,
    Endurance,
    Ordinary,
    Resistant,
    Total,
    Speed,
    Dexterity,
    Intelligence,
    Ego,
}

impl Characteristic {
    /// Sheet order.
    pub const ALL: [Characteristic; 14] = [
        Characteristic::Strength,
        Characteristic::Presence,
        Characteristic::Body,
        Characteristic::Stunned,
        Characteristic::Recovery,
        Characteristic::Knockout,
        Characteristic::Endurance,
        Characteristic::Ordinary,
        Characteristic::Resistant,
        Characteristic::Total,
        Characteristic::Speed,
        Characteristic::Dexterity,
        Characteristic::Intelligence,
        Characteristic::Ego,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Characteristic::Strength => "strength",
            Characteristic::Presence => "presence",
            Characteristic::Body => "body",
            Characteristic::Stunned => "stunned",
            Characteristic::Recovery => "recovery",
            Characteristic::Knockout => "knockout",
            Characteristic::Endurance => "endurance",
            Characteristic::Ordinary => "ordinary",
            Characteristic::Resistant => "resistant",
            Characteristic::Total => "total",
            Characteristic::Speed => "speed",
            Characteristic::Dexterity => "dexterity",
            Characteristic::Intelligence => "intelligence",
            Characteristic::Ego => "ego",
        }
    }

    /// Strength and presence are rolled, so their value is a dice formula.
    pub fn is_rolled(self) -> bool {
        matches!(self, Characteristic::Strength | Characteristic::Presence)
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Characteristic {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Characteristic::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| invalid(format!("unknown characteristic '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Score(i32),
    Formula(String),
}

impl From<i32> for CharacteristicValue {
    fn from(score: i32) -> Self {
        CharacteristicValue::Score(score)
    }
}

impl From<&str> for CharacteristicValue {
    fn from(formula: &str) -> Self {
        CharacteristicValue::Formula(formula.to_string())
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacteristicValue::Score(n) => write!(f, "{}", n),
            CharacteristicValue::Formula(s) => f.write_str(s),
        }
    }
}

/// A characteristic's value plus free-form notes about it.
///
/// Sheets may write an entry as a bare value (`body: 10`) or as
/// `{ value, details }`; entries without details serialize back to the bare form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntryRepr", into = "EntryRepr")]
pub struct CharacteristicEntry {
    pub value: CharacteristicValue,
    pub details: String,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum EntryRepr {
    Full {
        value: CharacteristicValue,
        #[serde(default)]
        details: String,
    },
    Bare(CharacteristicValue),
}

impl From<EntryRepr> for CharacteristicEntry {
    fn from(repr: EntryRepr) -> Self {
        match repr {
            EntryRepr::Full { value, details } => Self { value, details },
            EntryRepr::Bare(value) => Self {
                value,
                details: String::new(),
            },
        }
    }
}

impl From<CharacteristicEntry> for EntryRepr {
    fn from(entry: CharacteristicEntry) -> Self {
        if entry.details.is_empty() {
            EntryRepr::Bare(entry.value)
        } else {
            EntryRepr::Full {
                value: entry.value,
                details: entry.details,
            }
        }
    }
}

/// A hero's characteristics, keyed by name. Any characteristic may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacteristicSet {
    values: IndexMap<Characteristic, CharacteristicEntry>,
}

impl CharacteristicSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The characteristics a freshly created hero starts with.
    pub fn hero_defaults() -> Self {
        use Characteristic::*;
        Self::new()
            .with(Strength, "2d6")
            .with(Presence, "2d6")
            .with(Body, 10)
            .with(Recovery, 10)
            .with(Stunned, 10)
            .with(Knockout, 20)
            .with(Endurance, 30)
            .with(Ordinary, 10)
            .with(Resistant, 10)
            .with(Total, 10)
            .with(Speed, 1)
            .with(Dexterity, 11)
            .with(Intelligence, 11)
            .with(Ego, 11)
    }

    pub fn with(mut self, name: Characteristic, value: impl Into<CharacteristicValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets the value of `name`, keeping any details already written for it.
    pub fn set(&mut self, name: Characteristic, value: impl Into<CharacteristicValue>) {
        let value = value.into();
        match self.values.entry(name) {
            Entry::Occupied(mut slot) => slot.get_mut().value = value,
            Entry::Vacant(slot) => {
                slot.insert(CharacteristicEntry {
                    value,
                    details: String::new(),
                });
            }
        }
    }

    pub fn remove(&mut self, name: Characteristic) -> Option<CharacteristicValue> {
        self.values.shift_remove(&name).map(|entry| entry.value)
    }

    pub fn get(&self, name: Characteristic) -> Option<&CharacteristicValue> {
        self.values.get(&name).map(|entry| &entry.value)
    }

    pub fn entry(&self, name: Characteristic) -> Option<&CharacteristicEntry> {
        self.values.get(&name)
    }

    pub fn details(&self, name: Characteristic) -> Option<&str> {
        self.values.get(&name).map(|entry| entry.details.as_str())
    }

    pub fn set_details(&mut self, name: Characteristic, details: impl Into<String>) -> Result<()> {
        let entry = self
            .values
            .get_mut(&name)
            .ok_or(EngineError::MissingCharacteristic(name))?;
        entry.details = details.into();
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Characteristic, &CharacteristicValue)> {
        self.values.iter().map(|(k, entry)| (*k, &entry.value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric value of `name`.
    pub fn score(&self, name: Characteristic) -> Result<i32> {
        match self.get(name) {
            Some(CharacteristicValue::Score(n)) => Ok(*n),
            Some(CharacteristicValue::Formula(f)) => Err(invalid(format!(
                "characteristic {} holds the dice formula '{}', not a number",
                name, f
            ))),
            None => Err(EngineError::MissingCharacteristic(name)),
        }
    }

    /// Parsed dice formula of a rolled characteristic.
    pub fn formula(&self, name: Characteristic) -> Result<DiceFormula> {
        match self.get(name) {
            Some(CharacteristicValue::Formula(f)) => f.parse(),
            Some(CharacteristicValue::Score(n)) => Err(invalid(format!(
                "characteristic {} is the number {}, not a dice formula",
                name, n
            ))),
            None => Err(EngineError::MissingCharacteristic(name)),
        }
    }
}

impl FromIterator<(Characteristic, CharacteristicValue)> for CharacteristicSet {
    fn from_iter<I: IntoIterator<Item = (Characteristic, CharacteristicValue)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.set(name, value);
        }
        set
    }
}
