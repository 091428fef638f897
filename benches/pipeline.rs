//! Per-tick cost of the hot modules: the pipeline exists to run once per
//! incoming sample, so its cost per tick is the thing worth tracking.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use phasecore_dsp::biquad::{BiquadBank, BiquadCoeffs};
use phasecore_dsp::fir::FirBank;
use phasecore_dsp::slice::Slice;

fn biquad_bank_tick(c: &mut Criterion) {
    let mut bank: BiquadBank<i32, 4, 16, 3> = BiquadBank::new();
    for b in 0..4 {
        bank.set_coefficients(0, b, BiquadCoeffs::new(8, 100, -50, 64, 0, -64));
        bank.set_stages_active(b, 1);
    }
    let mut input: Slice<i32, 1, 16> = Slice::default();
    for c in 0..16 {
        input.set(0, c, (c as i32) * 17 - 100);
    }
    let mut output: Slice<i32, 4, 16> = Slice::default();
    c.bench_function("biquad_bank_4x16x1_tick", |bencher| {
        bencher.iter(|| {
            bank.apply_bank_once(black_box(&input), &mut output);
            black_box(&output);
        });
    });
}

fn fir_bank_tick(c: &mut Criterion) {
    let mut bank: FirBank<i32, 4, 16, 16, 32> = FirBank::new();
    for b in 0..4 {
        for k in 0..16 {
            bank.set_one_coefficient(b, k, ((k + b) as i32) % 7 - 3);
        }
        bank.set_one_geometry(b, 4, 16);
    }
    let mut input: Slice<i32, 1, 16> = Slice::default();
    for c in 0..16 {
        input.set(0, c, (c as i32) * 17 - 100);
    }
    let mut output: Slice<i32, 4, 16> = Slice::default();
    c.bench_function("fir_bank_4x16x16_tick", |bencher| {
        bencher.iter(|| {
            bank.apply_bank_once(black_box(&input), &mut output);
            black_box(&output);
        });
    });
}

criterion_group!(benches, biquad_bank_tick, fir_bank_tick);
criterion_main!(benches);
