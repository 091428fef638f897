//! Target/flag derivation and the phase-aligned trigger state machine.

use crate::error::BankOutOfRange;
use crate::int::FixedInt;
use crate::slice::Slice;

/// Zero-crossing target: for each trigger, pick the rising or falling delay
/// of its selected `(bank, chan)`. Invalid indices leave the destination
/// cell untouched (caller-initialized).
pub fn zc_target<I: FixedInt, const B: usize, const C: usize, const T: usize>(
    src_banks: &[usize; T],
    src_chans: &[usize; T],
    want_falling: &[bool; T],
    rise_delays: &Slice<I, B, C>,
    fall_delays: &Slice<I, B, C>,
    signals_out: &mut [I; T],
) {
    for t in 0..T {
        let (bank, chan) = (src_banks[t], src_chans[t]);
        if bank < B && chan < C {
            signals_out[t] = if want_falling[t] {
                fall_delays.get(bank, chan)
            } else {
                rise_delays.get(bank, chan)
            };
        }
    }
}

/// Phase target: `(nominal_target * period) >> 8`, `nominal_target`
/// interpreted as an 8-bit phase fraction.
pub fn phase_target<I: FixedInt, const B: usize, const C: usize, const T: usize>(
    src_banks: &[usize; T],
    src_chans: &[usize; T],
    periods: &Slice<I, B, C>,
    nominal_targets: &[I; T],
    targets_out: &mut [I; T],
) {
    for t in 0..T {
        let (bank, chan) = (src_banks[t], src_chans[t]);
        if bank < B && chan < C {
            let period = periods.get(bank, chan);
            let product = nominal_targets[t].wrapping_mul(period);
            targets_out[t] = if I::IS_SIGNED { product.asr(8) } else { product.asr_u(8) };
        }
    }
}

/// Combined ZC + phase target. `want_phase` takes priority over
/// `want_falling`.
#[allow(clippy::too_many_arguments)]
pub fn zc_and_phase_target<I: FixedInt, const B: usize, const C: usize, const T: usize>(
    src_banks: &[usize; T],
    src_chans: &[usize; T],
    want_phase: &[bool; T],
    want_falling: &[bool; T],
    rise_delays: &Slice<I, B, C>,
    fall_delays: &Slice<I, B, C>,
    periods: &Slice<I, B, C>,
    nominal_targets: &[I; T],
    signals_out: &mut [I; T],
    targets_out: &mut [I; T],
) {
    for t in 0..T {
        let (bank, chan) = (src_banks[t], src_chans[t]);
        if bank >= B || chan >= C {
            continue;
        }
        if want_phase[t] {
            signals_out[t] = rise_delays.get(bank, chan);
            let period = periods.get(bank, chan);
            let product = nominal_targets[t].wrapping_mul(period);
            targets_out[t] = if I::IS_SIGNED { product.asr(8) } else { product.asr_u(8) };
        } else {
            signals_out[t] = if want_falling[t] {
                fall_delays.get(bank, chan)
            } else {
                rise_delays.get(bank, chan)
            };
            targets_out[t] = nominal_targets[t];
        }
    }
}

/// `a AND (maybe negated) b`, or just `a` if no secondary signal is used.
/// Invalid `(bank, chan)` produces `false`.
pub fn conditional_flag_dual<const B: usize, const C: usize, const T: usize>(
    src_banks: &[usize; T],
    src_chans: &[usize; T],
    want_secondary: &[bool; T],
    negate_secondary: &[bool; T],
    primary: &Slice<bool, B, C>,
    secondary: &Slice<bool, B, C>,
) -> [bool; T] {
    let mut out = [false; T];
    for t in 0..T {
        let (bank, chan) = (src_banks[t], src_chans[t]);
        if bank >= B || chan >= C {
            continue;
        }
        let a = primary.get(bank, chan);
        out[t] = if want_secondary[t] {
            let mut b = secondary.get(bank, chan);
            if negate_secondary[t] {
                b = !b;
            }
            a && b
        } else {
            a
        };
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerState {
    Idle,
    WaitRise,
    WaitFall,
    WaitCool,
}

/// A single phase-aligned pulse generator. `duration` and `cooldown` must be
/// at least 1; enforced by [`Trigger::new`] and [`Trigger::set_timing`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Trigger<I> {
    duration: I,
    cooldown: I,
    reraise_ok: bool,
    state: TriggerState,
    timeout_left: I,
    saved_target: I,
    prev_signal: I,
    unwrap_offset: I,
}

impl<I: FixedInt> Trigger<I> {
    pub fn new(duration: I, cooldown: I, reraise_ok: bool) -> Self {
        Self {
            duration: if duration >= I::ONE { duration } else { I::ONE },
            cooldown: if cooldown >= I::ONE { cooldown } else { I::ONE },
            reraise_ok,
            state: TriggerState::Idle,
            timeout_left: I::ZERO,
            saved_target: I::ZERO,
            prev_signal: I::ZERO,
            unwrap_offset: I::ZERO,
        }
    }

    pub fn set_timing(&mut self, duration: I, cooldown: I) {
        self.duration = if duration >= I::ONE { duration } else { I::ONE };
        self.cooldown = if cooldown >= I::ONE { cooldown } else { I::ONE };
    }

    pub fn force_idle(&mut self) {
        self.state = TriggerState::Idle;
        self.timeout_left = I::ZERO;
        self.saved_target = I::ZERO;
        self.prev_signal = I::ZERO;
        self.unwrap_offset = I::ZERO;
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Advance one tick; returns `true` iff the pulse is currently asserted
    /// (state is [`TriggerState::WaitFall`]).
    pub fn step(
        &mut self,
        sig: I,
        target: I,
        period: I,
        detect: bool,
        trigger_count_left: &mut I,
    ) -> bool {
        match self.state {
            TriggerState::Idle => {
                if detect && *trigger_count_left > I::ZERO {
                    *trigger_count_left = trigger_count_left.wrapping_sub(I::ONE);
                    self.state = TriggerState::WaitRise;
                    let mut saved = target;
                    if sig >= saved {
                        saved = saved.wrapping_add(period);
                        if sig >= saved {
                            saved = saved.wrapping_add(period);
                        }
                    }
                    self.saved_target = saved;
                    self.unwrap_offset = I::ZERO;
                    self.prev_signal = sig;
                }
            }
            TriggerState::WaitRise => {
                let mut sig = sig.wrapping_add(self.unwrap_offset);
                let half_period = if I::IS_SIGNED { period.asr(1) } else { period.asr_u(1) };
                if sig.wrapping_add(half_period) < self.prev_signal {
                    self.unwrap_offset = self.unwrap_offset.wrapping_add(period);
                    sig = sig.wrapping_add(period);
                }
                self.prev_signal = sig;
                if sig >= self.saved_target {
                    self.timeout_left = self.duration;
                    self.state = TriggerState::WaitFall;
                }
            }
            TriggerState::WaitFall => {
                if self.timeout_left > I::ZERO {
                    self.timeout_left = self.timeout_left.wrapping_sub(I::ONE);
                }
                if self.timeout_left == I::ZERO {
                    self.timeout_left = self.cooldown;
                    self.state = TriggerState::WaitCool;
                }
            }
            TriggerState::WaitCool => {
                if self.timeout_left > I::ZERO {
                    self.timeout_left = self.timeout_left.wrapping_sub(I::ONE);
                }
                if self.timeout_left == I::ZERO && (!detect || self.reraise_ok) {
                    self.state = TriggerState::Idle;
                }
            }
        }
        self.state == TriggerState::WaitFall
    }
}

/// `[B][C]` triggers plus a shared pulse-count/window quota and an enable
/// mask.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerBank<I, const B: usize, const C: usize> {
    triggers: [[Trigger<I>; C]; B],
    enabled: [[bool; C]; B],
    trigger_count_left: I,
    window_time_left: I,
    banks_active: usize,
    chans_active: usize,
}

impl<I: FixedInt, const B: usize, const C: usize> TriggerBank<I, B, C> {
    pub fn new(duration: I, cooldown: I, reraise_ok: bool) -> Self {
        Self {
            triggers: [[Trigger::new(duration, cooldown, reraise_ok); C]; B],
            enabled: [[true; C]; B],
            trigger_count_left: I::ZERO,
            window_time_left: I::ZERO,
            banks_active: B,
            chans_active: C,
        }
    }

    pub fn set_active_geometry(&mut self, banks_active: usize, chans_active: usize) {
        self.banks_active = banks_active.min(B);
        self.chans_active = chans_active.min(C);
    }

    /// Like [`Self::set_active_geometry`], but rejects a `banks_active` that
    /// exceeds the compiled bank count instead of silently clamping it.
    pub fn try_set_active_geometry(
        &mut self,
        banks_active: usize,
        chans_active: usize,
    ) -> Result<(), BankOutOfRange> {
        if banks_active > B {
            return Err(BankOutOfRange { index: banks_active, bank_count: B });
        }
        self.set_active_geometry(banks_active, chans_active);
        Ok(())
    }

    pub fn set_enabled(&mut self, bank: usize, chan: usize, enabled: bool) {
        if bank < B && chan < C {
            self.enabled[bank][chan] = enabled;
        }
    }

    pub fn enable_triggering(&mut self, window: I, max_pulses: I) {
        self.window_time_left = window;
        self.trigger_count_left = max_pulses;
    }

    pub fn disable_triggering(&mut self) {
        self.window_time_left = I::ZERO;
        self.trigger_count_left = I::ZERO;
    }

    pub fn force_idle(&mut self) {
        for row in self.triggers.iter_mut() {
            for trig in row.iter_mut() {
                trig.force_idle();
            }
        }
        self.trigger_count_left = I::ZERO;
        self.window_time_left = I::ZERO;
    }

    /// Decrements the shared window counter first (closing the quota, but
    /// never interrupting a pulse already in flight), then dispatches each
    /// enabled cell in the active subrectangle to its trigger.
    pub fn process_samples(
        &mut self,
        sig: &Slice<I, B, C>,
        target: &Slice<I, B, C>,
        period: &Slice<I, B, C>,
        detect: &Slice<bool, B, C>,
        out: &mut Slice<bool, B, C>,
    ) {
        if self.window_time_left > I::ZERO {
            self.window_time_left = self.window_time_left.wrapping_sub(I::ONE);
        }
        if self.window_time_left == I::ZERO {
            self.trigger_count_left = I::ZERO;
        }

        for b in 0..self.banks_active {
            for c in 0..self.chans_active {
                if !self.enabled[b][c] {
                    continue;
                }
                let pulse = self.triggers[b][c].step(
                    sig.get(b, c),
                    target.get(b, c),
                    period.get(b, c),
                    detect.get(b, c),
                    &mut self.trigger_count_left,
                );
                out.set(b, c, pulse);
            }
        }
    }
}
