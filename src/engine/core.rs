use crate::vector::{match_mask, Pack, Scalar};

/// One result vector emitted per engine step.
///
/// Only packets with `commit == true` are real output units; the rest are
/// placeholders that keep the one-packet-per-step cadence and are skipped
/// by the writer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Packet<T, const W: usize> {
    pub data: Pack<T, W>,
    pub commit: bool,
}

/// The compaction state machine.
///
/// Consumes one input pack per step and repacks the matching lanes
/// (`value >= threshold`) densely, in order, into full-width output packs.
/// State is two partially filled packs and a fill cursor:
///
/// - `current`: the output pack being filled; lanes `[0, fill)` hold
///   matches carried over from earlier steps.
/// - `next`: the overflow pack that receives matches past lane `W - 1`
///   within a single step; it becomes `current` when `current` fills up.
/// - `fill`: number of occupied lanes in `current`, always `< W` between
///   steps.
///
/// Each step scatters the step's matches to destinations `fill + rank` in
/// the logical concatenation `current ++ next` (rank = exclusive count of
/// earlier matches in the same pack). A step can produce at most `W`
/// matches, so the overflow never reaches past lane `W - 2` of `next` and
/// two packs of state always suffice.
///
/// One `Compactor` serves exactly one invocation: feed every input pack to
/// [`absorb`](Self::absorb), then call [`finish`](Self::finish) for the
/// flush packet and the total match count.
#[derive(Debug)]
pub struct Compactor<T, const W: usize> {
    threshold: T,
    current: Pack<T, W>,
    next: Pack<T, W>,
    fill: usize,
    matches: u64,
}

impl<T: Scalar, const W: usize> Compactor<T, W> {
    pub fn new(threshold: T) -> Self {
        Compactor {
            threshold,
            current: Pack::zeroed(),
            next: Pack::zeroed(),
            fill: 0,
            matches: 0,
        }
    }

    /// Total matches observed so far.
    #[inline]
    pub fn matches(&self) -> u64 {
        self.matches
    }

    /// Process one input pack and emit this step's packet.
    ///
    /// The packet commits exactly when `current` filled up this step; the
    /// overflow then rotates `next` into `current`. Unused lanes of every
    /// committed pack are zero: packs start zeroed and only match lanes are
    /// ever written.
    pub fn absorb(&mut self, input: &Pack<T, W>) -> Packet<T, W> {
        let mask = match_mask(input, self.threshold);
        let fill_before = self.fill;
        let mut rank = 0usize;
        for w in 0..W {
            if mask[w] {
                let dest = fill_before + rank;
                if dest < W {
                    self.current.0[dest] = input.0[w];
                } else {
                    self.next.0[dest - W] = input.0[w];
                }
                rank += 1;
            }
        }

        self.matches += rank as u64;
        self.fill = (fill_before + rank) % W;

        let full = fill_before + rank >= W;
        let emitted = Packet {
            data: self.current,
            commit: full,
        };
        if full {
            self.current = self.next;
            self.next = Pack::zeroed();
        }
        emitted
    }

    /// The synthetic flush step: emit whatever `current` holds and the
    /// final match count.
    ///
    /// The flush packet commits only when a partial residue exists, so the
    /// number of committed packets over a whole invocation is exactly
    /// `ceil(matches / W)`.
    pub fn finish(self) -> (Packet<T, W>, u64) {
        let residue = Packet {
            data: self.current,
            commit: self.fill > 0,
        };
        (residue, self.matches)
    }
}
