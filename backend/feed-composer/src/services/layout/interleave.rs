//! Interleave sequencer.
//!
//! Merges the three size tiers back into one presentation sequence by cycling
//! through [`INTERLEAVE_PATTERN`]. Empty tiers are skipped at their turn, so
//! the output always has exactly as many entries as the input.

use std::collections::VecDeque;

use crate::models::SizeClass;

/// Repeating emission cycle
pub const INTERLEAVE_PATTERN: [SizeClass; 6] = [
    SizeClass::Large,
    SizeClass::Medium,
    SizeClass::Small,
    SizeClass::Medium,
    SizeClass::Small,
    SizeClass::Medium,
];

/// Reorder tiered entries. Order within a tier is preserved.
pub fn interleave<T>(tiered: Vec<(SizeClass, T)>) -> Vec<(SizeClass, T)> {
    let total = tiered.len();
    let mut large = VecDeque::new();
    let mut medium = VecDeque::new();
    let mut small = VecDeque::new();

    for (class, entry) in tiered {
        match class {
            SizeClass::Large => large.push_back(entry),
            SizeClass::Medium => medium.push_back(entry),
            SizeClass::Small => small.push_back(entry),
        }
    }

    let mut sequence = Vec::with_capacity(total);
    while sequence.len() < total {
        for class in INTERLEAVE_PATTERN {
            let queue = match class {
                SizeClass::Large => &mut large,
                SizeClass::Medium => &mut medium,
                SizeClass::Small => &mut small,
            };
            if let Some(entry) = queue.pop_front() {
                sequence.push((class, entry));
            }
        }
    }

    sequence
}
