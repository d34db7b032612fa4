use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use thiserror::Error;

use crate::engine::{Compactor, Packet};
use crate::vector::{Pack, Scalar};

/// Default channel depth between pipeline stages.
/// Capacity only affects stage overlap, never results.
pub const DEFAULT_CAPACITY: usize = 2048;

/// Precondition violations, rejected before any streaming begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("vector width must be at least one lane")]
    ZeroWidth,
    #[error("channel capacity must be at least 1")]
    ZeroCapacity,
    #[error("input length {len} is not a multiple of the vector width {width}")]
    RaggedInput { len: usize, width: usize },
}

/// Invocation parameters for one filter run.
///
/// `report_count: false` selects the fixed-length invocation shape: the
/// caller already knows how many values survive (or scans for a sentinel),
/// so the count output is elided. The engine is identical either way.
#[derive(Clone, Copy, Debug)]
pub struct FilterConfig<T> {
    pub threshold: T,
    pub capacity: usize,
    pub report_count: bool,
}

impl<T: Scalar> FilterConfig<T> {
    pub fn new(threshold: T) -> Self {
        FilterConfig {
            threshold,
            capacity: DEFAULT_CAPACITY,
            report_count: true,
        }
    }
}

/// The densely repacked output of one filter run.
///
/// `packs` always holds `input.len() / W` vectors; lanes past the match
/// count are zero. `matches` is `None` when count reporting was elided.
#[derive(Clone, Debug, PartialEq)]
pub struct Compacted<T, const W: usize> {
    pub packs: Vec<Pack<T, W>>,
    pub matches: Option<u64>,
}

impl<T: Scalar, const W: usize> Compacted<T, W> {
    /// The output buffer as a flat scalar sequence in lane order. Only the
    /// first `matches` values are meaningful.
    pub fn flattened(&self) -> Vec<T> {
        crate::vector::flatten(&self.packs)
    }
}

/// Run the three-stage filter/compaction pipeline over `input`.
///
/// Returns `ceil(N/W)` output packs holding the matching values
/// (`value >= threshold`) densely packed in their original order, plus the
/// match count. Each stage runs on its own thread, connected by bounded
/// channels; results are identical for every capacity >= 1.
///
/// `input.len()` must be a multiple of `W`; validation happens up front and
/// a violation aborts the call before any stage starts.
pub fn filter_compact<T: Scalar, const W: usize>(
    input: &[T],
    config: &FilterConfig<T>,
) -> Result<Compacted<T, W>, ConfigError> {
    validate::<W>(input.len(), config.capacity)?;

    let threshold = config.threshold;
    let mut packs = vec![Pack::zeroed(); input.len() / W];
    let total = thread::scope(|s| {
        let (pack_tx, pack_rx) = mpsc::sync_channel::<Pack<T, W>>(config.capacity);
        let (packet_tx, packet_rx) = mpsc::sync_channel::<Packet<T, W>>(config.capacity);
        s.spawn(move || read_stage(input, pack_tx));
        let engine = s.spawn(move || compact_stage(threshold, pack_rx, packet_tx));
        write_stage(packet_rx, &mut packs);
        engine.join().expect("compaction stage panicked")
    });

    let matches = total.min(input.len() as u64);
    Ok(Compacted {
        packs,
        matches: config.report_count.then_some(matches),
    })
}

fn validate<const W: usize>(len: usize, capacity: usize) -> Result<(), ConfigError> {
    if W == 0 {
        return Err(ConfigError::ZeroWidth);
    }
    if capacity == 0 {
        return Err(ConfigError::ZeroCapacity);
    }
    if len % W != 0 {
        return Err(ConfigError::RaggedInput { len, width: W });
    }
    Ok(())
}

/// Source stage: emit the input as packs, one per step, in buffer order.
/// Closes the channel by dropping the sender after `N / W` sends.
fn read_stage<T: Scalar, const W: usize>(input: &[T], tx: SyncSender<Pack<T, W>>) {
    for chunk in input.chunks_exact(W) {
        if tx.send(Pack::from_slice(chunk)).is_err() {
            return;
        }
    }
}

/// Compaction stage: one packet per input pack plus the flush packet, then
/// the total match count.
fn compact_stage<T: Scalar, const W: usize>(
    threshold: T,
    rx: Receiver<Pack<T, W>>,
    tx: SyncSender<Packet<T, W>>,
) -> u64 {
    let mut engine = Compactor::new(threshold);
    for pack in rx.iter() {
        if tx.send(engine.absorb(&pack)).is_err() {
            return engine.matches();
        }
    }
    let (residue, matches) = engine.finish();
    let _ = tx.send(residue);
    matches
}

/// Sink stage: place committed packs into the output buffer in order,
/// capped at the buffer length; skip placeholders.
fn write_stage<T: Scalar, const W: usize>(rx: Receiver<Packet<T, W>>, out: &mut [Pack<T, W>]) {
    let mut slot = 0;
    for packet in rx.iter() {
        if packet.commit && slot < out.len() {
            out[slot] = packet.data;
            slot += 1;
        }
    }
}
