//! Universe buffer
//!
//! Holds the latest 512-channel snapshot for every DMX universe that has
//! received a frame. The buffer is the only structure shared between the
//! Art-Net listener task and the tick loop: writers replace a whole universe
//! at once, so a reader never sees a partially updated universe.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use crate::{CoreError, Result};

/// Number of channels in one DMX universe
pub const CHANNELS_PER_UNIVERSE: usize = 512;

/// Highest Art-Net port address (15 bits)
pub const MAX_UNIVERSE: u16 = 32767;

/// One universe worth of channel values
pub type Universe = [u8; CHANNELS_PER_UNIVERSE];

/// Last frame buffered for a universe
#[derive(Debug, Clone)]
pub struct UniverseFrame {
    channels: Arc<Universe>,
    received: usize,
}

impl UniverseFrame {
    /// All 512 channels, zero past the received data
    pub fn channels(&self) -> &Universe {
        &self.channels
    }

    /// Number of channels the frame actually carried
    pub fn received(&self) -> usize {
        self.received
    }

    /// Received channels within `range`.
    ///
    /// Shorter than the range when the frame stopped early; empty when it
    /// stopped before `range.start`.
    pub fn received_window(&self, range: Range<usize>) -> &[u8] {
        let end = range.end.min(self.received);
        let start = range.start.min(end);
        &self.channels[start..end]
    }
}

/// Shared, cloneable handle to the per-universe channel snapshots
#[derive(Debug, Clone, Default)]
pub struct UniverseBuffer {
    universes: Arc<RwLock<BTreeMap<u16, UniverseFrame>>>,
}

impl UniverseBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a universe with new data, zero-padded to 512 channels.
    ///
    /// Data beyond 512 channels is ignored. The previous snapshot is
    /// discarded entirely (last writer wins, no merge).
    pub fn replace(&self, universe: u16, data: &[u8]) {
        let mut channels = [0u8; CHANNELS_PER_UNIVERSE];
        let len = data.len().min(CHANNELS_PER_UNIVERSE);
        channels[..len].copy_from_slice(&data[..len]);

        let frame = UniverseFrame {
            channels: Arc::new(channels),
            received: len,
        };
        self.universes.write().insert(universe, frame);
        tracing::trace!("Universe {} replaced ({} channels)", universe, len);
    }

    /// Last frame of a universe, if it was ever populated
    pub fn get(&self, universe: u16) -> Option<UniverseFrame> {
        self.universes.read().get(&universe).cloned()
    }

    /// Copy of a universe's channels; all zero if never populated
    pub fn snapshot(&self, universe: u16) -> Universe {
        self.get(universe)
            .map(|frame| *frame.channels())
            .unwrap_or([0u8; CHANNELS_PER_UNIVERSE])
    }

    /// Read `length` channels starting at the 0-based `offset`
    pub fn window(&self, universe: u16, offset: usize, length: usize) -> Result<Vec<u8>> {
        check_window(offset, length)?;
        let channels = self.snapshot(universe);
        Ok(channels[offset..offset + length].to_vec())
    }

    /// Whether a frame for this universe has been buffered at least once
    pub fn is_populated(&self, universe: u16) -> bool {
        self.universes.read().contains_key(&universe)
    }

    /// All universes that currently hold data, in ascending order
    pub fn populated_universes(&self) -> Vec<u16> {
        self.universes.read().keys().copied().collect()
    }

    /// Forget all buffered universes
    pub fn clear(&self) {
        self.universes.write().clear();
    }
}

/// Bounds check shared by the buffer and the binding table
pub(crate) fn check_window(offset: usize, length: usize) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= CHANNELS_PER_UNIVERSE => Ok(()),
        _ => Err(CoreError::OutOfRange { offset, length }),
    }
}
