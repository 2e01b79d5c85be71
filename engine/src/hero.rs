use serde::{Deserialize, Serialize};

use crate::Dice;
use crate::characteristics::{Characteristic, CharacteristicSet};
use crate::combat::{resolve_derived, CombatRecord};
use crate::effect::EffectRollResult;
use crate::error::Result;
use crate::items::Item;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub earned: f64,
    #[serde(default)]
    pub used: f64,
    /// Derived; recomputed by [`Hero::prepare_derived`].
    #[serde(default, skip_deserializing)]
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statements {
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub second: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub statements: Statements,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub xp: Experience,
    #[serde(default = "CharacteristicSet::hero_defaults")]
    pub characteristics: CharacteristicSet,
    #[serde(default = "CombatRecord::for_new_hero")]
    pub combat: CombatRecord,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Hero {
    /// A new hero with the starting characteristics and an unresolved combat record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            real_name: String::new(),
            title: String::new(),
            statements: Statements::default(),
            notes: String::new(),
            xp: Experience::default(),
            characteristics: CharacteristicSet::hero_defaults(),
            combat: CombatRecord::for_new_hero(),
            items: Vec::new(),
        }
    }

    /// Fill unset combat fields and recompute unspent experience.
    pub fn prepare_derived(&mut self) -> Result<()> {
        resolve_derived(&self.characteristics, &mut self.combat)?;
        self.xp.left = self.xp.earned - self.xp.used;
        tracing::debug!(hero = %self.name, xp_left = self.xp.left, "derived data prepared");
        Ok(())
    }

    /// Effect roll of a rolled characteristic such as strength.
    pub fn roll_characteristic(
        &self,
        dice: &mut Dice,
        name: Characteristic,
    ) -> Result<EffectRollResult> {
        let formula = self.characteristics.formula(name)?;
        let roll = formula.roll(dice);
        let result = EffectRollResult::from_roll(&roll);
        tracing::debug!(
            hero = %self.name,
            characteristic = %name,
            formula = %roll.formula,
            effect = result.effect_total(),
            "characteristic roll"
        );
        Ok(result)
    }

    pub fn chat_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| i.can_post_to_chat())
    }
}
