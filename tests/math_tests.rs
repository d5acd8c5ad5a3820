// Host-side tests for range mapping and strength smoothing.

use spectral_corridor::core::*;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn map_range_hits_endpoints_and_midpoint() {
    assert!(close(map_range(0.0, 0.0, 255.0, 0.0, 1.0).unwrap(), 0.0));
    assert!(close(map_range(255.0, 0.0, 255.0, 0.0, 1.0).unwrap(), 1.0));
    assert!(close(map_range(127.5, 0.0, 255.0, 0.0, 1.0).unwrap(), 0.5));
}

#[test]
fn map_range_extrapolates_and_inverts() {
    assert!(close(map_range(20.0, 0.0, 10.0, 0.0, 1.0).unwrap(), 2.0));
    assert!(close(map_range(2.5, 0.0, 10.0, 1.0, 0.0).unwrap(), 0.75));
    assert!(close(map_range(-1.0, -2.0, 2.0, 0.0, 8.0).unwrap(), 2.0));
}

#[test]
fn map_range_rejects_empty_input_range() {
    let err = map_range(3.0, 5.0, 5.0, 0.0, 1.0).unwrap_err();
    assert_eq!(err, RangeError::Degenerate { from: 5.0, to: 5.0 });
    assert!(RangeMap::new(0.0, f32::INFINITY, 0.0, 1.0).is_err());
    assert!(RangeMap::new(f32::NAN, 1.0, 0.0, 1.0).is_err());
}

#[test]
fn range_map_matches_free_function() {
    let m = RangeMap::new(10.0, 20.0, -1.0, 1.0).unwrap();
    for v in [10.0, 12.5, 15.0, 19.0, 30.0] {
        assert!(close(m.apply(v), map_range(v, 10.0, 20.0, -1.0, 1.0).unwrap()));
    }
}

#[test]
fn byte_to_unit_covers_analyser_range() {
    assert!(close(BYTE_TO_UNIT.apply(0.0), 0.0));
    assert!(close(BYTE_TO_UNIT.apply(255.0), 1.0));
}

#[test]
fn lerp_endpoints() {
    assert!(close(lerp(2.0, 6.0, 0.0), 2.0));
    assert!(close(lerp(2.0, 6.0, 1.0), 6.0));
    assert!(close(lerp(2.0, 6.0, 0.25), 3.0));
}

#[test]
fn frequency_to_strength_is_quarter_step() {
    // From the initial strength toward silence
    assert!(close(frequency_to_strength(0, 1.5), 1.125));
    // Full-scale sample from rest
    assert!(close(frequency_to_strength(255, 0.0), 0.25));
    // Already at the target
    assert!(close(frequency_to_strength(255, 1.0), 1.0));
}

#[test]
fn smoothing_converges_monotonically() {
    let mut s = INITIAL_STRENGTH;
    let target = 128.0 / 255.0;
    let mut prev_gap = (s - target).abs();
    for _ in 0..60 {
        s = frequency_to_strength(128, s);
        let gap = (s - target).abs();
        assert!(gap <= prev_gap);
        prev_gap = gap;
    }
    assert!(prev_gap < 1e-4);
}

#[test]
fn smoothing_factor_one_snaps() {
    assert!(close(smooth_strength(51, 0.9, 1.0), 0.2));
}

#[test]
fn lerp_quarter_step_from_initial_strength() {
    assert!(close(lerp(1.5, 0.5, 0.25), 1.25));
}

#[test]
fn lerp_is_fixed_at_equal_endpoints() {
    for a in [-3.0, 0.0, 0.25, 1.5, 1000.0] {
        for t in [0.0, 0.1, 0.25, 0.5, 0.9, 1.0] {
            assert!(close(lerp(a, a, t), a));
        }
    }
}

#[test]
fn map_range_mid_byte() {
    let v = map_range(128.0, 0.0, 255.0, 0.0, 1.0).unwrap();
    assert!((v - 0.502).abs() < 1e-3);
}

#[test]
fn smoothed_strength_stays_between_previous_and_target() {
    for frequency in 0..=255u8 {
        let target = frequency as f32 / 255.0;
        for previous in [0.0, 0.25, 0.5, 1.0, 1.5, 3.0] {
            let next = frequency_to_strength(frequency, previous);
            let (lo, hi) = if previous < target {
                (previous, target)
            } else {
                (target, previous)
            };
            assert!(
                next >= lo - 1e-6 && next <= hi + 1e-6,
                "frequency {} previous {} gave {}",
                frequency,
                previous,
                next
            );
        }
    }
}
