//! Property-based tests for easing curves and deterministic noise.
//!
//! 1. Curves that cannot overshoot map any input into `[0, 1]`.
//! 2. Interpolation between equal endpoints is constant.
//! 3. `unit` lies in `[0, 1)` and `signed` in `[-1, 1)` for every input.
//! 4. Value noise stays in `[-1, 1]` and passes through its lattice values.

use proptest::prelude::*;
use typist_core::Easing;
use typist_core::noise::{signed, unit, value_noise};

fn any_curve() -> impl Strategy<Value = Easing> {
    prop_oneof![
        Just(Easing::Linear),
        Just(Easing::Smooth),
        Just(Easing::Sine),
        Just(Easing::SineIn),
        Just(Easing::SineOut),
        Just(Easing::Pow2In),
        Just(Easing::Pow2Out),
        Just(Easing::Pow2InOut),
        Just(Easing::Pow3In),
        Just(Easing::Pow3Out),
        Just(Easing::Bounce),
        Just(Easing::Elastic),
        Just(Easing::Back),
        Just(Easing::BackIn),
        any::<u8>().prop_map(Easing::Step),
    ]
}

proptest! {
    #[test]
    fn bounded_curves_stay_in_unit_range(curve in any_curve(), t in -10.0f32..10.0) {
        prop_assume!(!curve.can_overshoot());
        let v = curve.apply(t);
        prop_assert!((-1e-4..=1.0 + 1e-4).contains(&v), "{:?}({}) = {}", curve, t, v);
    }

    #[test]
    fn equal_endpoints_are_constant(curve in any_curve(), at in -100.0f32..100.0, t in 0.0f32..1.0) {
        let v = curve.interpolate(at, at, t);
        prop_assert!((v - at).abs() <= 1e-3 * at.abs().max(1.0));
    }

    #[test]
    fn hashed_noise_in_range(index in any::<u64>(), salt in any::<u64>()) {
        let u = unit(index, salt);
        prop_assert!((0.0..1.0).contains(&u));
        let s = signed(index, salt);
        prop_assert!((-1.0..1.0).contains(&s));
    }

    #[test]
    fn value_noise_bounded(x in -1.0e4f32..1.0e4, seed in any::<u64>()) {
        let v = value_noise(x, seed);
        prop_assert!((-1.0..=1.0).contains(&v), "{}", v);
    }

    #[test]
    fn value_noise_hits_lattice(i in 0u32..100_000, seed in any::<u64>()) {
        prop_assert_eq!(value_noise(i as f32, seed), signed(u64::from(i), seed));
    }
}
