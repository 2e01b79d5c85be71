use serde::{Deserialize, Serialize};

use crate::characteristics::{Characteristic, CharacteristicSet};
use crate::error::{invalid, Result};

pub const PHASE_SLOTS: usize = 6;
pub const DEFAULT_PHASES: u8 = 0b000100;
const MAX_PHASE_MASK: i64 = (1 << PHASE_SLOTS) - 1;

/// A current/maximum pair such as BODY or END. Unset halves are filled by
/// [`resolve_derived`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pool {
    #[serde(default)]
    pub value: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
}

impl Pool {
    pub fn new(value: i32, max: i32) -> Self {
        Self {
            value: Some(value),
            max: Some(max),
        }
    }

    pub fn full(max: i32) -> Self {
        Self::new(max, max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefenseEntry {
    #[serde(default)]
    pub value: Option<i32>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Defense {
    #[serde(default)]
    pub ordinary: DefenseEntry,
    #[serde(default)]
    pub resistant: DefenseEntry,
    #[serde(default)]
    pub total: DefenseEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRecord {
    #[serde(default = "default_phases")]
    pub phases: u8,
    #[serde(default)]
    pub initiative: Option<String>,
    #[serde(default)]
    pub combat_value: Option<String>,
    #[serde(default)]
    pub levels: String,
    /// Only tracked when present; an absent block is never defaulted.
    #[serde(default)]
    pub defense: Option<Defense>,
    #[serde(default)]
    pub stunned: Option<i32>,
    #[serde(default)]
    pub recovery: Option<i32>,
    #[serde(default)]
    pub body: Pool,
    #[serde(default)]
    pub knockout: Pool,
    #[serde(default)]
    pub endurance: Pool,
}

fn default_phases() -> u8 {
    DEFAULT_PHASES
}

impl Default for CombatRecord {
    fn default() -> Self {
        Self {
            phases: DEFAULT_PHASES,
            initiative: None,
            combat_value: None,
            levels: String::new(),
            defense: None,
            stunned: None,
            recovery: None,
            body: Pool::default(),
            knockout: Pool::default(),
            endurance: Pool::default(),
        }
    }
}

impl CombatRecord {
    /// Record of a freshly created hero: everything unset, defense tracked.
    pub fn for_new_hero() -> Self {
        Self {
            defense: Some(Defense::default()),
            ..Self::default()
        }
    }

    pub fn phase_schedule(&self) -> Result<PhaseSchedule> {
        PhaseSchedule::from_mask(i64::from(self.phases))
    }

    pub fn set_phases(&mut self, schedule: PhaseSchedule) {
        self.phases = schedule.mask();
    }

    /// Resolved copy of this record, leaving `self` untouched.
    pub fn resolved(&self, characteristics: &CharacteristicSet) -> Result<Self> {
        let mut combat = self.clone();
        resolve_derived(characteristics, &mut combat)?;
        Ok(combat)
    }
}

fn fill(
    slot: &mut Option<i32>,
    characteristics: &CharacteristicSet,
    from: Characteristic,
    field: &str,
) -> Result<()> {
    if slot.is_none() {
        let value = characteristics.score(from)?;
        tracing::trace!(field, value, source = %from, "defaulted from characteristic");
        *slot = Some(value);
    }
    Ok(())
}

fn fill_value(pool: &mut Pool, field: &str) {
    if pool.value.is_none() {
        tracing::trace!(field, value = ?pool.max, "defaulted from max");
        pool.value = pool.max;
    }
}

/// Fill every unset combat field from `characteristics`.
///
/// Maxima come first, then STUN and REC, then current values, which copy the
/// resolved maxima rather than the raw characteristics. A tracked defense block
/// is filled last. Fields already set are left alone, so running this twice
/// changes nothing.
///
/// Fails with `MissingCharacteristic` when an unset field needs a
/// characteristic that is absent. Fields filled before the failure stay filled.
pub fn resolve_derived(
    characteristics: &CharacteristicSet,
    combat: &mut CombatRecord,
) -> Result<()> {
    use Characteristic::*;

    fill(&mut combat.body.max, characteristics, Body, "body.max")?;
    fill(&mut combat.knockout.max, characteristics, Knockout, "knockout.max")?;
    fill(&mut combat.endurance.max, characteristics, Endurance, "endurance.max")?;

    fill(&mut combat.stunned, characteristics, Stunned, "stunned")?;
    fill(&mut combat.recovery, characteristics, Recovery, "recovery")?;

    fill_value(&mut combat.body, "body.value");
    fill_value(&mut combat.knockout, "knockout.value");
    fill_value(&mut combat.endurance, "endurance.value");

    if let Some(defense) = combat.defense.as_mut() {
        fill(&mut defense.ordinary.value, characteristics, Ordinary, "defense.ordinary")?;
        fill(&mut defense.resistant.value, characteristics, Resistant, "defense.resistant")?;
        fill(&mut defense.total.value, characteristics, Total, "defense.total")?;
    }

    tracing::debug!(
        body = ?combat.body,
        knockout = ?combat.knockout,
        endurance = ?combat.endurance,
        stunned = ?combat.stunned,
        recovery = ?combat.recovery,
        "combat record resolved"
    );
    Ok(())
}

/// The six phase slots of a turn. Slot 0 is the most significant bit of the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseSchedule([bool; PHASE_SLOTS]);

impl PhaseSchedule {
    pub fn new(flags: [bool; PHASE_SLOTS]) -> Self {
        Self(flags)
    }

    pub fn from_mask(mask: i64) -> Result<Self> {
        decode_phases(mask).map(Self)
    }

    pub fn mask(&self) -> u8 {
        encode_phases(self.0)
    }

    pub fn flags(&self) -> [bool; PHASE_SLOTS] {
        self.0
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.0.get(slot).copied().unwrap_or(false)
    }

    pub fn active_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(slot, _)| slot)
    }
}

impl TryFrom<&[bool]> for PhaseSchedule {
    type Error = crate::EngineError;

    fn try_from(flags: &[bool]) -> Result<Self> {
        let flags: [bool; PHASE_SLOTS] = flags.try_into().map_err(|_| {
            invalid(format!(
                "a phase schedule has {} slots, got {}",
                PHASE_SLOTS,
                flags.len()
            ))
        })?;
        Ok(Self(flags))
    }
}

pub fn encode_phases(flags: [bool; PHASE_SLOTS]) -> u8 {
    flags
        .iter()
        .fold(0u8, |mask, &on| (mask << 1) | u8::from(on))
}

pub fn decode_phases(mask: i64) -> Result<[bool; PHASE_SLOTS]> {
    if !(0..=MAX_PHASE_MASK).contains(&mask) {
        return Err(invalid(format!(
            "phase mask must be 0..={}, got {}",
            MAX_PHASE_MASK, mask
        )));
    }
    let mut flags = [false; PHASE_SLOTS];
    for (slot, flag) in flags.iter_mut().enumerate() {
        *flag = mask & (1 << (PHASE_SLOTS - 1 - slot)) != 0;
    }
    Ok(flags)
}
