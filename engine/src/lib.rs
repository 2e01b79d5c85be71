use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod characteristics;
pub mod combat;
pub mod content;
pub mod effect;
pub mod error;
pub mod formula;
pub mod hero;
pub mod items;

pub use characteristics::{
    Characteristic, CharacteristicEntry, CharacteristicSet, CharacteristicValue,
};
pub use combat::{
    decode_phases, encode_phases, resolve_derived, CombatRecord, Defense, DefenseEntry,
    PhaseSchedule, Pool,
};
pub use effect::{effect_value, evaluate, DiceCount, EffectRollResult, FaceMark};
pub use error::{EngineError, Result};
pub use formula::{DiceFormula, DiceTerm, DieResult, Keep, Roll, RolledTerm, Term};
pub use hero::{Experience, Hero, Statements};
pub use items::{Item, ItemKind};

enum Source {
    Seeded(ChaCha8Rng),
    Scripted { faces: Vec<u32>, next: usize },
}

/// Random source handed to every roll the engine makes.
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Replays `faces` in order and starts over once they run out.
    /// Faces are clamped into the rolled die's range; an empty script always shows 1.
    pub fn from_scripted(faces: Vec<u32>) -> Self {
        Self {
            source: Source::Scripted { faces, next: 0 },
        }
    }

    /// Roll one die with `sides` faces.
    pub fn roll(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(1..=sides),
            Source::Scripted { faces, next } => {
                let face = if faces.is_empty() {
                    1
                } else {
                    faces[*next % faces.len()]
                };
                *next += 1;
                face.clamp(1, sides)
            }
        }
    }

    pub fn d6(&mut self) -> u32 {
        self.roll(6)
    }
}
