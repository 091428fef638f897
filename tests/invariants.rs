//! Property-based checks for the universally-quantified invariants: an
//! all-zero stream stays all-zero through every stage, auto-ranger output
//! stays within tolerance of the requested window, a zero-stage biquad chain
//! and a zero-coefficient FIR are identity/zero respectively, and hysteresis
//! degenerates to a plain threshold when both inputs agree.

use phasecore_dsp::autorange::AutoRangerBank;
use phasecore_dsp::biquad::{BiquadBank, BiquadChain, BiquadCoeffs, CHAIN_BUF_LEN};
use phasecore_dsp::detect::HysteresisDetector;
use phasecore_dsp::fir::FirBank;
use phasecore_dsp::slice::Slice;
use proptest::prelude::*;

#[test]
fn all_zero_stream_stays_zero_through_biquad_and_fir() {
    let mut chain: BiquadChain<i32, 2> = BiquadChain::new();
    chain.set_stage(0, BiquadCoeffs::new(4, 7, -3, 1, 2, -1));
    chain.set_stage(1, BiquadCoeffs::new(2, -1, 1, 3, -2, 1));
    chain.set_stages_active(2);
    for _ in 0..50 {
        assert_eq!(chain.apply_once(0), 0);
    }

    let mut fir: FirBank<i32, 1, 1, 4, 8> = FirBank::new();
    fir.set_one_coefficient(0, 0, 5);
    fir.set_one_coefficient(0, 1, -3);
    fir.set_one_geometry(0, 0, 2);
    let input: Slice<i32, 1, 1> = Slice::default();
    let mut output: Slice<i32, 1, 1> = Slice::default();
    for _ in 0..20 {
        fir.apply_bank_once(&input, &mut output);
        assert_eq!(output.get(0, 0), 0);
    }
}

proptest! {
    #[test]
    fn biquad_bank_with_zero_active_stages_is_identity_after_settling(
        samples in proptest::collection::vec(-10_000i32..10_000, 1..40)
    ) {
        let mut bank: BiquadBank<i32, 1, 1, 3> = BiquadBank::new();
        bank.set_active_geometry(1, 1);
        // stages_active defaults to 0: identity after the buffer settles.
        let mut output: Slice<i32, 1, 1> = Slice::default();
        let mut history = Vec::new();
        for &s in &samples {
            let mut input: Slice<i32, 1, 1> = Slice::default();
            input.set(0, 0, s);
            bank.apply_bank_once(&input, &mut output);
            history.push(output.get(0, 0));
        }
        for i in CHAIN_BUF_LEN..samples.len() {
            prop_assert_eq!(history[i], samples[i]);
        }
    }

    #[test]
    fn autoranger_running_output_stays_within_tolerance(
        samples in proptest::collection::vec(-30_000i32..30_000, 1..60)
    ) {
        let newmin = -1000i32;
        let newmax = 1000i32;
        let mut ranger: AutoRangerBank<i32, u32, 1> = AutoRangerBank::new(newmin, newmax, false);
        for &s in &samples {
            let mut input: Slice<i32, 1, 1> = Slice::default();
            input.set(0, 0, s);
            ranger.update_from_sample(&input);
        }
        for &s in &samples {
            let out = ranger.get_running_output(0, s);
            prop_assert!(out >= newmin - 1 && out <= newmax + 1);
        }
    }

    #[test]
    fn hysteresis_equals_single_threshold_when_activate_equals_sustain(
        values in proptest::collection::vec(any::<bool>(), 1..30)
    ) {
        let mut detector: HysteresisDetector<1, 1> = HysteresisDetector::new();
        let mut output: Slice<bool, 1, 1> = Slice::default();
        for &v in &values {
            let mut activate: Slice<bool, 1, 1> = Slice::default();
            activate.set(0, 0, v);
            detector.update(&activate, &activate, &mut output);
            prop_assert_eq!(output.get(0, 0), v);
        }
    }
}
