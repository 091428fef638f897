//! Winner-take-all and conditional-latch utilities over [`Slice`]s.

use crate::slice::Slice;

/// For each channel `c`, copy `source[selections[c]][c]` into a single-bank
/// destination row. An out-of-range selection defaults to bank 0.
pub fn select_winning_banks<T: Copy + Default, const B: usize, const C: usize>(
    source: &Slice<T, B, C>,
    selections: &[usize; C],
) -> Slice<T, 1, C> {
    let mut dest: Slice<T, 1, C> = Slice::default();
    for (c, &sel) in selections.iter().enumerate() {
        let bank = if sel < B { sel } else { 0 };
        dest.set(0, c, source.get(bank, c));
    }
    dest
}

/// Cell-wise: where `flags[b][c] == replace_flag`, overwrite
/// `target[b][c]` with `new[b][c]`.
pub fn conditionally_latch_new<T: Copy, F: Copy + PartialEq, const B: usize, const C: usize>(
    target: &mut Slice<T, B, C>,
    new: &Slice<T, B, C>,
    flags: &Slice<F, B, C>,
    replace_flag: F,
) {
    for b in 0..B {
        for c in 0..C {
            if flags.get(b, c) == replace_flag {
                target.set(b, c, new.get(b, c));
            }
        }
    }
}

/// Per channel, the argmax bank index over `source[0..active_banks]`, plus
/// whether that winner sits strictly inside the scanned range (neither bank 0
/// nor bank `active_banks - 1`).
pub fn identify_winning_banks<T: Copy + PartialOrd, const B: usize, const C: usize>(
    source: &Slice<T, B, C>,
    active_banks: usize,
    active_chans: usize,
) -> (Slice<usize, 1, C>, Slice<bool, 1, C>)
where
    usize: Default,
{
    let mut selections: Slice<usize, 1, C> = Slice::from_cells([[0usize; C]; 1]);
    let mut was_local: Slice<bool, 1, C> = Slice::from_cells([[false; C]; 1]);
    let active_banks = active_banks.min(B);
    let active_chans = active_chans.min(C);
    for c in 0..active_chans {
        if active_banks == 0 {
            continue;
        }
        let mut best_bank = 0usize;
        let mut best_val = source.get(0, c);
        for b in 1..active_banks {
            let v = source.get(b, c);
            if v > best_val {
                best_val = v;
                best_bank = b;
            }
        }
        selections.set(0, c, best_bank);
        let local = best_bank != 0 && best_bank != active_banks.saturating_sub(1);
        was_local.set(0, c, local);
    }
    (selections, was_local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_winning_banks_defaults_out_of_range_to_bank_zero() {
        let mut source: Slice<i32, 2, 2> = Slice::default();
        source.set(0, 0, 1);
        source.set(1, 0, 2);
        let result = select_winning_banks(&source, &[7, 1]);
        // channel 0 selection 7 is out of range -> bank 0.
        assert_eq!(result.get(0, 0), 1);
        assert_eq!(result.get(0, 1), source.get(1, 1));
    }

    #[test]
    fn identify_winning_banks_marks_edges_as_not_local() {
        let mut source: Slice<i32, 4, 1> = Slice::default();
        source.set(0, 0, 1);
        source.set(1, 0, 5);
        source.set(2, 0, 2);
        source.set(3, 0, 0);
        let (selections, was_local) = identify_winning_banks(&source, 4, 1);
        assert_eq!(selections.get(0, 0), 1);
        assert!(was_local.get(0, 0));
    }

    #[test]
    fn conditionally_latch_new_only_touches_matching_flags() {
        let mut target: Slice<i32, 1, 2> = Slice::default();
        target.set(0, 0, 10);
        target.set(0, 1, 20);
        let mut new: Slice<i32, 1, 2> = Slice::default();
        new.set(0, 0, 99);
        new.set(0, 1, 99);
        let mut flags: Slice<bool, 1, 2> = Slice::default();
        flags.set(0, 0, true);
        conditionally_latch_new(&mut target, &new, &flags, true);
        assert_eq!(target.get(0, 0), 99);
        assert_eq!(target.get(0, 1), 20);
    }
}
