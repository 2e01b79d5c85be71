use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::Dice;
use crate::error::{invalid, EngineError, Result};
use crate::formula::{DiceFormula, DiceTerm, Roll, Term, MAX_DICE};

pub const EFFECT_DIE_SIDES: u32 = 6;

/// Effect value of a single d6 face: a 1 counts 0, a 6 counts 2, anything else 1.
pub fn effect_value(face: u32) -> u32 {
    match face {
        1 => 0,
        6 => 2,
        _ => 1,
    }
}

/// Number of dice in an effect roll. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DiceCount(u32);

impl DiceCount {
    /// Counts below 1 are raised to 1.
    pub fn new(count: i64) -> Result<Self> {
        if count > i64::from(MAX_DICE) {
            return Err(invalid(format!(
                "cannot roll {} dice: rolls are capped at {} dice to bound memory use",
                count, MAX_DICE
            )));
        }
        Ok(Self(count.max(1) as u32))
    }

    /// For counts coming from loosely typed sources. Rejects NaN, infinities
    /// and fractional counts.
    pub fn from_f64(count: f64) -> Result<Self> {
        if !count.is_finite() {
            return Err(invalid(format!("dice count must be finite, got {}", count)));
        }
        if count.fract() != 0.0 {
            return Err(invalid(format!("dice count must be whole, got {}", count)));
        }
        if count > MAX_DICE as f64 {
            return Err(invalid(format!(
                "cannot roll {} dice: rolls are capped at {} dice to bound memory use",
                count, MAX_DICE
            )));
        }
        Self::new(count as i64)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for DiceCount {
    fn default() -> Self {
        Self(1)
    }
}

impl FromStr for DiceCount {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::new(n);
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Self::from_f64(n),
            Err(_) => Err(invalid(format!("dice count '{}' is not a number", s))),
        }
    }
}

impl From<DiceCount> for DiceFormula {
    fn from(count: DiceCount) -> Self {
        DiceFormula::from_terms(vec![Term::Dice {
            negative: false,
            dice: DiceTerm::new(count.get(), EFFECT_DIE_SIDES),
        }])
    }
}

/// Display hint for a face: lowest and highest faces are highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceMark {
    Min,
    Max,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectRollResult {
    raw_faces: Vec<u32>,
    effect_values: Vec<u32>,
    effect_total: u64,
    conventional_total: u64,
}

impl EffectRollResult {
    /// Builds the result from faces already rolled. Every face must be a d6 face.
    pub fn from_faces(faces: Vec<u32>) -> Result<Self> {
        if let Some(bad) = faces.iter().find(|f| !(1..=EFFECT_DIE_SIDES).contains(*f)) {
            return Err(invalid(format!("{} is not a d6 face", bad)));
        }
        Ok(Self::from_valid_faces(faces))
    }

    /// Effect reading of every active d6 in `roll`; other dice are ignored.
    pub fn from_roll(roll: &Roll) -> Self {
        let faces = roll
            .terms
            .iter()
            .filter(|t| t.dice.sides == EFFECT_DIE_SIDES)
            .flat_map(|t| t.active_faces())
            .collect();
        Self::from_valid_faces(faces)
    }

    fn from_valid_faces(raw_faces: Vec<u32>) -> Self {
        let effect_values: Vec<u32> = raw_faces.iter().copied().map(effect_value).collect();
        let effect_total = effect_values.iter().copied().map(u64::from).sum();
        let conventional_total = raw_faces.iter().copied().map(u64::from).sum();
        Self {
            raw_faces,
            effect_values,
            effect_total,
            conventional_total,
        }
    }

    pub fn raw_faces(&self) -> &[u32] {
        &self.raw_faces
    }

    pub fn effect_values(&self) -> &[u32] {
        &self.effect_values
    }

    pub fn effect_total(&self) -> u64 {
        self.effect_total
    }

    pub fn conventional_total(&self) -> u64 {
        self.conventional_total
    }

    pub fn marks(&self) -> Vec<FaceMark> {
        self.raw_faces
            .iter()
            .map(|&f| match f {
                1 => FaceMark::Min,
                6 => FaceMark::Max,
                _ => FaceMark::Plain,
            })
            .collect()
    }
}

impl fmt::Display for EffectRollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |values: &[u32], sep: &str| {
            values
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(sep)
        };
        write!(
            f,
            "{} → effect {} ({}), total {}",
            join(&self.raw_faces, " "),
            self.effect_total,
            join(&self.effect_values, "+"),
            self.conventional_total
        )
    }
}

/// Roll `count` d6 as an effect roll.
pub fn evaluate(dice: &mut Dice, count: DiceCount) -> EffectRollResult {
    let roll = DiceFormula::from(count).roll(dice);
    let result = EffectRollResult::from_roll(&roll);
    tracing::debug!(
        dice = count.get(),
        effect = result.effect_total,
        total = result.conventional_total,
        "effect roll"
    );
    result
}
