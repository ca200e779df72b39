use rstest::{fixture, rstest};
use weighid_core::{ObjectDetector, Outcome, TrackedObject};
use weighid_hardware::MemoryEeprom;

#[fixture]
fn detector() -> ObjectDetector<MemoryEeprom> {
    let mut d = ObjectDetector::new(MemoryEeprom::new(128), 0);
    for (i, (w, t)) in [(0.0, 0.0), (100.0, 5.0), (250.0, 5.0), (500.0, 5.0)]
        .into_iter()
        .enumerate()
    {
        d.set_object(i, w, t);
    }
    d.save_config().unwrap();
    d
}

#[rstest]
fn four_stable_readings_confirm_slot(mut detector: ObjectDetector<MemoryEeprom>) {
    let got: Vec<Outcome> = (0..4).map(|_| detector.process(101.0)).collect();
    assert_eq!(
        got,
        vec![
            Outcome::NoChange,
            Outcome::NoChange,
            Outcome::NoChange,
            Outcome::Object(1)
        ]
    );
    assert_eq!(got[3].code(), 1);
}

#[rstest]
fn confirmation_fires_once_per_stable_run(mut detector: ObjectDetector<MemoryEeprom>) {
    for _ in 0..3 {
        assert_eq!(detector.process(250.0), Outcome::NoChange);
    }
    assert_eq!(detector.process(250.0), Outcome::Object(2));
    assert_eq!(detector.stable_count(), 0);

    // Counter restarted: the next one is quiet, then a full run is needed again.
    assert_eq!(detector.process(250.0), Outcome::NoChange);
    assert_eq!(detector.process(250.0), Outcome::NoChange);
    assert_eq!(detector.process(250.0), Outcome::NoChange);
    assert_eq!(detector.process(250.0), Outcome::Object(2));
}

#[test]
fn shortest_debounce_still_skips_a_reading_between_confirmations() {
    let mut d = weighid_core::DetectorBuilder::new()
        .with_store(MemoryEeprom::new(128))
        .with_config(weighid_core::DetectorCfg {
            match_samples: 2,
            ..weighid_core::DetectorCfg::default()
        })
        .build()
        .unwrap();
    d.set_object(1, 100.0, 5.0);
    d.save_config().unwrap();

    let got: Vec<Outcome> = (0..6).map(|_| d.process(100.0)).collect();
    assert_eq!(
        got,
        vec![
            Outcome::NoChange,
            Outcome::Object(1),
            Outcome::NoChange,
            Outcome::Object(1),
            Outcome::NoChange,
            Outcome::Object(1),
        ]
    );
}

#[rstest]
#[case(105.0, Outcome::NoMatch)]
#[case(95.0, Outcome::NoMatch)]
#[case(104.99, Outcome::NoChange)]
#[case(95.01, Outcome::NoChange)]
fn tolerance_band_is_strict(
    mut detector: ObjectDetector<MemoryEeprom>,
    #[case] value: f32,
    #[case] expected: Outcome,
) {
    assert_eq!(detector.process(value), expected);
    if expected == Outcome::NoChange {
        assert_eq!(detector.current_object(), TrackedObject::Candidate(1));
    } else {
        assert_eq!(detector.current_object(), TrackedObject::NoMatch);
    }
}

#[rstest]
fn change_threshold_is_strict(mut detector: ObjectDetector<MemoryEeprom>) {
    detector.process(1.0);
    assert_eq!(detector.current_object(), TrackedObject::NoMatch);
    // Exactly 0.04 away still counts as a change and is re-evaluated.
    assert_eq!(detector.process(0.96), Outcome::NoMatch);
    assert_eq!(detector.previous_value(), 0.96);
}

#[rstest]
fn zero_weight_slot_with_zero_tolerance_never_matches(
    mut detector: ObjectDetector<MemoryEeprom>,
) {
    detector.process(300.0);
    // Lands in the empty band, not in slot 0.
    assert_eq!(detector.process(0.0), Outcome::NoObject);
    assert_eq!(detector.current_object(), TrackedObject::NoObject);
}

#[rstest]
#[case(0.0)]
#[case(0.039)]
#[case(-0.039)]
fn near_zero_after_a_change_reports_empty(
    mut detector: ObjectDetector<MemoryEeprom>,
    #[case] value: f32,
) {
    detector.process(500.0);
    assert_eq!(detector.process(value), Outcome::NoObject);
    assert_eq!(detector.stable_count(), 0);
    // Stays empty while readings do not move.
    assert_eq!(detector.process(value), Outcome::NoChange);
    assert_eq!(detector.current_object(), TrackedObject::NoObject);
}

#[rstest]
fn small_readings_from_rest_are_unchanged(mut detector: ObjectDetector<MemoryEeprom>) {
    // previous starts at 0.0, so tiny readings are not a change at all.
    assert_eq!(detector.process(0.01), Outcome::NoChange);
    assert_eq!(detector.current_object(), TrackedObject::NoObject);
}

#[rstest]
fn overlapping_bands_pick_highest_slot(mut detector: ObjectDetector<MemoryEeprom>) {
    detector.set_object(2, 102.0, 5.0);
    for _ in 0..3 {
        detector.process(101.0);
    }
    assert_eq!(detector.process(101.0), Outcome::Object(2));
}

#[rstest]
fn switching_candidate_restarts_debounce(mut detector: ObjectDetector<MemoryEeprom>) {
    detector.process(101.0);
    detector.process(101.0);
    detector.process(101.0);
    assert_eq!(detector.process(251.0), Outcome::NoChange);
    assert_eq!(detector.current_object(), TrackedObject::Candidate(2));
    assert_eq!(detector.stable_count(), 1);
    detector.process(251.0);
    detector.process(251.0);
    assert_eq!(detector.process(251.0), Outcome::Object(2));
}

#[rstest]
fn unmatched_reading_resets_count(mut detector: ObjectDetector<MemoryEeprom>) {
    detector.process(101.0);
    detector.process(101.0);
    assert_eq!(detector.process(180.0), Outcome::NoMatch);
    assert_eq!(detector.stable_count(), 0);
    // Stable while unmatched: nothing to confirm.
    for _ in 0..6 {
        assert_eq!(detector.process(180.0), Outcome::NoChange);
    }
}

#[rstest]
#[case(4)]
#[case(7)]
#[case(usize::MAX)]
fn out_of_range_setters_are_ignored(
    mut detector: ObjectDetector<MemoryEeprom>,
    #[case] index: usize,
) {
    let before = *detector.record();
    detector.set_object(index, 42.0, 1.0);
    assert_eq!(*detector.record(), before);
    assert_eq!(detector.get_object_weight(index), 0.0);
}

#[rstest]
fn object_weight_accessor(detector: ObjectDetector<MemoryEeprom>) {
    assert_eq!(detector.get_object_weight(1), 100.0);
    assert_eq!(detector.get_object_weight(3), 500.0);
    assert_eq!(detector.get_object_weight(0), 0.0);
}

#[rstest]
fn offset_is_stored_but_not_applied(mut detector: ObjectDetector<MemoryEeprom>) {
    detector.set_offset(50.0);
    assert_eq!(detector.get_offset(), 50.0);
    for _ in 0..3 {
        detector.process(101.0);
    }
    assert_eq!(detector.process(101.0), Outcome::Object(1));
}

#[test]
fn apply_objects_sets_rows() {
    let mut d = ObjectDetector::new(MemoryEeprom::new(64), 0);
    d.apply_objects(&[
        weighid_config::ObjectRow {
            slot: 2,
            weight: 42.0,
            tolerance: 2.0,
        },
        weighid_config::ObjectRow {
            slot: 9,
            weight: 1.0,
            tolerance: 1.0,
        },
    ]);
    assert_eq!(d.object(2), Some((42.0, 2.0)));
    assert_eq!(d.get_object_weight(2), 42.0);
}
