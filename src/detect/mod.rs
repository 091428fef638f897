//! Envelope averaging, hysteresis thresholding, and edge de-glitching.

use crate::int::FixedInt;
use crate::slice::Slice;

/// First-order exponential averager with a separate output-scaling
/// coefficient. `avg_bits` sets the settling time (~`2^avg_bits` samples);
/// `coeff_bits`/`coeff` additionally scale the reported average.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Averager<S> {
    running_sum: S,
    coeff: S,
    avg_bits: u8,
    coeff_bits: u8,
}

impl<S: FixedInt> Averager<S> {
    pub fn new(avg_bits: u8, coeff_bits: u8, coeff: S) -> Self {
        Self {
            running_sum: S::ZERO,
            coeff,
            avg_bits,
            coeff_bits,
        }
    }

    #[inline]
    fn shift(&self, v: S, k: u32) -> S {
        if S::IS_SIGNED { v.asr(k) } else { v.asr_u(k) }
    }

    /// Seeds `running_sum` so the first output is already settled, avoiding
    /// the startup transient of starting from zero.
    pub fn init_average(&mut self, input: S) {
        let mut sum = input;
        for _ in 0..self.avg_bits {
            sum = sum.wrapping_add(sum);
        }
        self.running_sum = sum;
    }

    pub fn update(&mut self, input: S) -> S {
        let avg = self.shift(self.running_sum, self.avg_bits as u32);
        self.running_sum = self.running_sum.wrapping_sub(avg).wrapping_add(input);
        self.shift(avg.wrapping_mul(self.coeff), self.coeff_bits as u32)
    }
}

/// Cell-wise `in >= threshold`. Stateless.
pub fn single_threshold_test<S: FixedInt, const B: usize, const C: usize>(
    input: &Slice<S, B, C>,
    threshold: &Slice<S, B, C>,
    output: &mut Slice<bool, B, C>,
) {
    for b in 0..B {
        for c in 0..C {
            output.set(b, c, input.get(b, c) >= threshold.get(b, c));
        }
    }
}

/// Hysteresis ("dual-threshold") test: a cell turns on when `activate` fires
/// and stays on while `sustain` holds, independent of further `activate`
/// values.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HysteresisDetector<const B: usize, const C: usize> {
    prev_state: [[bool; C]; B],
}

impl<const B: usize, const C: usize> HysteresisDetector<B, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_state(&mut self) {
        self.prev_state = [[false; C]; B];
    }

    pub fn update(
        &mut self,
        activate: &Slice<bool, B, C>,
        sustain: &Slice<bool, B, C>,
        output: &mut Slice<bool, B, C>,
    ) {
        for b in 0..B {
            for c in 0..C {
                let out = activate.get(b, c) || (self.prev_state[b][c] && sustain.get(b, c));
                self.prev_state[b][c] = out;
                output.set(b, c, out);
            }
        }
    }
}

/// Per-cell rise/fall debouncer: an edge must hold for `rise_delay` (to turn
/// on) or `fall_delay` (to turn off) consecutive opposite-polarity samples.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct DeglitchCell<I> {
    rise_delay: I,
    fall_delay: I,
    rise_countdown: I,
    fall_countdown: I,
    last_output: bool,
}

impl<I: FixedInt> Default for DeglitchCell<I> {
    fn default() -> Self {
        Self {
            rise_delay: I::ZERO,
            fall_delay: I::ZERO,
            rise_countdown: I::ZERO,
            fall_countdown: I::ZERO,
            last_output: false,
        }
    }
}

impl<I: FixedInt> DeglitchCell<I> {
    fn set_delays(&mut self, rise: I, fall: I) {
        self.rise_delay = rise;
        self.fall_delay = fall;
        self.rise_countdown = rise;
        self.fall_countdown = fall;
        self.last_output = false;
    }

    fn step(&mut self, input: bool) -> bool {
        if self.last_output {
            if input {
                self.fall_countdown = self.fall_delay;
            } else if self.fall_countdown == I::ZERO {
                self.last_output = false;
                self.rise_countdown = self.rise_delay;
            } else {
                self.fall_countdown = self.fall_countdown.wrapping_sub(I::ONE);
            }
        } else if !input {
            self.rise_countdown = self.rise_delay;
        } else if self.rise_countdown == I::ZERO {
            self.last_output = true;
            self.fall_countdown = self.fall_delay;
        } else {
            self.rise_countdown = self.rise_countdown.wrapping_sub(I::ONE);
        }
        self.last_output
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deglitcher<I, const B: usize, const C: usize> {
    cells: [[DeglitchCell<I>; C]; B],
}

impl<I: FixedInt, const B: usize, const C: usize> Default for Deglitcher<I, B, C> {
    fn default() -> Self {
        Self {
            cells: [[DeglitchCell::default(); C]; B],
        }
    }
}

impl<I: FixedInt, const B: usize, const C: usize> Deglitcher<I, B, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_delays(&mut self, bank: usize, chan: usize, rise: I, fall: I) {
        if bank < B && chan < C {
            self.cells[bank][chan].set_delays(rise, fall);
        }
    }

    pub fn update(&mut self, input: &Slice<bool, B, C>, output: &mut Slice<bool, B, C>) {
        for b in 0..B {
            for c in 0..C {
                let out = self.cells[b][c].step(input.get(b, c));
                output.set(b, c, out);
            }
        }
    }
}
