//! Fixture binding table
//!
//! Resolved once at show start from the configured DMX entries and
//! immutable afterwards. Re-binding means loading the show again.

use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Range;

use crate::fixture::FixtureKind;
use crate::settings::{DmxEntry, FixtureSpec};
use crate::universe::{check_window, MAX_UNIVERSE};
use crate::{CoreError, Result};

/// A fixture's channel window within a universe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureBinding {
    /// Universe the fixture listens to
    pub universe: u16,
    /// First channel (0-based)
    pub offset: usize,
    /// Number of consecutive channels
    pub footprint: usize,
    /// Fixture definition
    pub fixture: FixtureSpec,
}

impl FixtureBinding {
    /// Kind of the bound fixture
    pub fn kind(&self) -> FixtureKind {
        self.fixture.kind
    }

    /// Channel range within the universe
    pub fn channels(&self) -> Range<usize> {
        self.offset..self.offset + self.footprint
    }
}

/// Validated, ordered set of fixture bindings
#[derive(Debug, Clone, Default, Serialize)]
pub struct BindingTable {
    bindings: Vec<FixtureBinding>,
}

impl BindingTable {
    /// Resolve configured entries into bindings.
    ///
    /// Fails on universes above 32767, windows that run past channel 512,
    /// and windows that overlap within one universe. Order is preserved.
    pub fn resolve(entries: &[DmxEntry]) -> Result<Self> {
        let mut bindings = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.universe > MAX_UNIVERSE {
                return Err(CoreError::ConfigError(format!(
                    "Universe {} out of range (0-{})",
                    entry.universe, MAX_UNIVERSE
                )));
            }

            let footprint = entry.fixture.kind.footprint();
            check_window(entry.offset, footprint)?;

            bindings.push(FixtureBinding {
                universe: entry.universe,
                offset: entry.offset,
                footprint,
                fixture: entry.fixture.clone(),
            });
        }

        check_overlaps(&bindings)?;

        tracing::debug!("Resolved {} fixture bindings", bindings.len());
        Ok(Self { bindings })
    }

    /// Bindings in configuration order
    pub fn bindings(&self) -> &[FixtureBinding] {
        &self.bindings
    }

    /// Universes with at least one bound fixture, ascending
    pub fn used_universes(&self) -> Vec<u16> {
        let mut universes: Vec<u16> = self.bindings.iter().map(|b| b.universe).collect();
        universes.sort_unstable();
        universes.dedup();
        universes
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if there are no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn check_overlaps(bindings: &[FixtureBinding]) -> Result<()> {
    let mut per_universe: BTreeMap<u16, Vec<Range<usize>>> = BTreeMap::new();
    for binding in bindings {
        per_universe
            .entry(binding.universe)
            .or_default()
            .push(binding.channels());
    }

    for (universe, mut ranges) in per_universe {
        ranges.sort_by_key(|range| range.start);
        for pair in ranges.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(CoreError::OverlappingBindings {
                    universe,
                    first: pair[0].clone(),
                    second: pair[1].clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn entry(universe: u16, offset: usize) -> DmxEntry {
        DmxEntry {
            universe,
            offset,
            fixture: FixtureSpec {
                kind: FixtureKind::MovingHead,
                location: Vec3::ZERO,
                max_distance: None,
            },
        }
    }

    #[test]
    fn test_resolve_keeps_order() {
        let table = BindingTable::resolve(&[entry(1, 7), entry(0, 0), entry(1, 0)]).unwrap();
        assert_eq!(table.len(), 3);
        let offsets: Vec<_> = table.bindings().iter().map(|b| (b.universe, b.offset)).collect();
        assert_eq!(offsets, vec![(1, 7), (0, 0), (1, 0)]);
        assert_eq!(table.used_universes(), vec![0, 1]);
    }

    #[test]
    fn test_footprint_from_kind() {
        let table = BindingTable::resolve(&[entry(0, 10)]).unwrap();
        let binding = &table.bindings()[0];
        assert_eq!(binding.footprint, 7);
        assert_eq!(binding.channels(), 10..17);
        assert_eq!(binding.kind(), FixtureKind::MovingHead);
    }

    #[test]
    fn test_adjacent_windows_are_fine() {
        assert!(BindingTable::resolve(&[entry(0, 0), entry(0, 7), entry(0, 505)]).is_ok());
    }

    #[test]
    fn test_overlap_rejected() {
        let err = BindingTable::resolve(&[entry(0, 0), entry(0, 6)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::OverlappingBindings { universe: 0, .. }
        ));
    }

    #[test]
    fn test_same_offset_other_universe() {
        assert!(BindingTable::resolve(&[entry(0, 0), entry(1, 0)]).is_ok());
    }

    #[test]
    fn test_window_past_end_rejected() {
        let err = BindingTable::resolve(&[entry(0, 506)]).unwrap_err();
        assert!(matches!(err, CoreError::OutOfRange { offset: 506, length: 7 }));
    }

    #[test]
    fn test_universe_out_of_range() {
        assert!(matches!(
            BindingTable::resolve(&[entry(32768, 0)]),
            Err(CoreError::ConfigError(_))
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = BindingTable::resolve(&[]).unwrap();
        assert!(table.is_empty());
        assert!(table.used_universes().is_empty());
    }
}
