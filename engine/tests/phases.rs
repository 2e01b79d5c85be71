use engine::{decode_phases, encode_phases, CombatRecord, EngineError, PhaseSchedule};
use proptest::prelude::*;

#[test]
fn slot_zero_is_the_high_bit() {
    assert_eq!(encode_phases([true, false, false, false, false, false]), 32);
    assert_eq!(encode_phases([false, false, false, false, false, true]), 1);
    assert_eq!(encode_phases([false, false, false, true, false, false]), 4);
    assert_eq!(decode_phases(4).unwrap(), [false, false, false, true, false, false]);
    assert_eq!(decode_phases(63).unwrap(), [true; 6]);
    assert_eq!(decode_phases(0).unwrap(), [false; 6]);
}

#[test]
fn out_of_range_masks_are_rejected() {
    for bad in [-1, 64, 255, i64::MAX] {
        assert!(matches!(decode_phases(bad), Err(EngineError::InvalidArgument(_))));
    }
}

#[test]
fn every_mask_round_trips() {
    for mask in 0..=63u8 {
        let flags = decode_phases(i64::from(mask)).unwrap();
        assert_eq!(encode_phases(flags), mask);
    }
}

#[test]
fn schedule_from_slice_needs_six_slots() {
    let ok = PhaseSchedule::try_from(&[false, true, false, true, false, true][..]).unwrap();
    assert_eq!(ok.mask(), 21);
    assert_eq!(ok.active_slots().collect::<Vec<_>>(), vec![1, 3, 5]);

    let short = PhaseSchedule::try_from(&[true, true][..]);
    assert!(matches!(short, Err(EngineError::InvalidArgument(_))));
}

#[test]
fn combat_record_phase_accessors() {
    let mut combat = CombatRecord::default();
    let schedule = combat.phase_schedule().unwrap();
    assert!(schedule.is_active(3));
    assert_eq!(schedule.active_slots().count(), 1);

    combat.set_phases(PhaseSchedule::new([true, false, true, false, true, false]));
    assert_eq!(combat.phases, 42);

    combat.phases = 200;
    assert!(combat.phase_schedule().is_err());
}

proptest! {
    #[test]
    fn flags_round_trip(flags in any::<[bool; 6]>()) {
        let mask = encode_phases(flags);
        prop_assert!(mask <= 63);
        prop_assert_eq!(decode_phases(i64::from(mask)).unwrap(), flags);
    }
}
