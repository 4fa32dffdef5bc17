use std::cmp::Reverse;

use crate::helpe::*;

/// The four classic ways of picking a hole for an incoming process.
///
/// On the command line each one is selected by its initial.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug)]
pub enum FitKind {
    /// First fit: the first hole that is big enough
    #[value(name = "f", alias = "first")]
    First,
    /// Next fit: first fit, resuming from where the last search left off
    #[value(name = "n", alias = "next")]
    Next,
    /// Best fit: the hole that leaves the least space unused
    #[value(name = "b", alias = "best")]
    Best,
    /// Worst fit: the biggest hole
    #[value(name = "w", alias = "worst")]
    Worst,
}

/// Anything that can pick a hole out of a [MemoryMap].
///
/// Implementors must not mutate the map; they only tell the
/// caller where `size` units should go, if anywhere. The search
/// starts at `from`, which is the map's head for every strategy
/// that does not remember anything between calls.
pub trait FitStrategy {
    fn find_fit(&self, map: &MemoryMap, size: Units, from: SegmentId) -> Option<SegmentId>;
}

impl FitKind {
    pub const ALL: [FitKind; 4] = [FitKind::First, FitKind::Next, FitKind::Best, FitKind::Worst];

    pub fn name(&self) -> &'static str {
        match self {
            FitKind::First  => "first fit",
            FitKind::Next   => "next fit",
            FitKind::Best   => "best fit",
            FitKind::Worst  => "worst fit",
        }
    }

    /// Returns `true` if searches should resume from the
    /// simulator's cursor rather than from the head.
    #[inline(always)]
    pub fn uses_cursor(&self) -> bool {
        *self == FitKind::Next
    }
}

impl fmt::Display for FitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FitStrategy for FitKind {
    fn find_fit(&self, map: &MemoryMap, size: Units, from: SegmentId) -> Option<SegmentId> {
        let mut candidates = map.find(from, move |s| s.fits(size));
        match self {
            FitKind::First  => {
                candidates.next()
            },
            FitKind::Next   => {
                // Tail first, then wrap around and stop right
                // before the segment we started from.
                let wrapped = map.walk(map.head())
                    .take_while(|(id, _)| *id != from)
                    .filter(|(_, s)| s.fits(size))
                    .map(|(id, _)| id);
                candidates.chain(wrapped).next()
            },
            // `min_by_key` keeps the first of equal elements, which
            // gives us the leftmost hole on ties.
            FitKind::Best   => {
                candidates.filter_map(|id| map.get(id).map(|s| (id, s.len)))
                    .min_by_key(|&(_, len)| len - size)
                    .map(|(id, _)| id)
            },
            FitKind::Worst  => {
                candidates.filter_map(|id| map.get(id).map(|s| (id, s.len)))
                    .min_by_key(|&(_, len)| Reverse(len))
                    .map(|(id, _)| id)
            },
        }
    }
}
