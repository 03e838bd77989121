//! Scrolling mission world split into contiguous segments
//!
//! The world is a strip of length `length` scrolled past a viewport at a
//! constant rate. Each segment along it carries its own spawn rate and the
//! projectile kinds allowed there.

use serde::{Deserialize, Serialize};

use super::projectile::ProjectileKind;
use crate::error::ConfigError;

/// One geographic slice of the route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSegment {
    pub name: String,
    /// Base spawn probability factor for this stretch
    pub spawn_rate_base: f32,
    pub allowed_kinds: Vec<ProjectileKind>,
    pub start_offset: f32,
    pub end_offset: f32,
}

impl WorldSegment {
    pub fn length(&self) -> f32 {
        self.end_offset - self.start_offset
    }
}

/// Scroll position and segment bookkeeping for a mission run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldPartition {
    segments: Vec<WorldSegment>,
    length: f32,
    viewport_height: f32,
    scroll_speed: f32,
    units_per_km: f32,
    offset: f32,
}

impl WorldPartition {
    /// Validate and build. Segments must start at 0, abut each other and
    /// finish exactly at `length`.
    pub fn new(
        segments: Vec<WorldSegment>,
        length: f32,
        viewport_height: f32,
        scroll_speed: f32,
        units_per_km: f32,
    ) -> Result<Self, ConfigError> {
        if segments.is_empty() {
            return Err(ConfigError::EmptyRoute);
        }
        for (what, value) in [
            ("world length", length),
            ("viewport height", viewport_height),
            ("scroll speed", scroll_speed),
            ("units per km", units_per_km),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { what, value });
            }
        }
        if length <= viewport_height {
            return Err(ConfigError::WorldTooShort {
                length,
                viewport: viewport_height,
            });
        }

        let mut expected = 0.0;
        for (index, seg) in segments.iter().enumerate() {
            if (seg.start_offset - expected).abs() > 1e-3 {
                return Err(ConfigError::SegmentGap {
                    index,
                    name: seg.name.clone(),
                    expected,
                    found: seg.start_offset,
                });
            }
            if !(seg.length() > 0.0) {
                return Err(ConfigError::EmptySegment {
                    index,
                    name: seg.name.clone(),
                });
            }
            if seg.allowed_kinds.is_empty() {
                return Err(ConfigError::EmptyRoster {
                    index,
                    name: seg.name.clone(),
                });
            }
            if !(seg.spawn_rate_base >= 0.0) {
                return Err(ConfigError::NegativeSpawnRate {
                    index,
                    name: seg.name.clone(),
                    rate: seg.spawn_rate_base,
                });
            }
            for (i, kind) in seg.allowed_kinds.iter().enumerate() {
                if seg.allowed_kinds[..i].contains(kind) {
                    return Err(ConfigError::DuplicateKind { index, kind: *kind });
                }
            }
            expected = seg.end_offset;
        }
        if (expected - length).abs() > 1e-3 {
            return Err(ConfigError::RouteLengthMismatch {
                end: expected,
                length,
            });
        }

        Ok(Self {
            segments,
            length,
            viewport_height,
            scroll_speed,
            units_per_km,
            offset: 0.0,
        })
    }

    /// Advance the scroll; stops at the traversal point
    pub fn scroll(&mut self, dt: f32) {
        self.offset = (self.offset + self.scroll_speed * dt).min(self.traversal_offset());
    }

    /// Offset at which the last screenful is in view
    #[inline]
    pub fn traversal_offset(&self) -> f32 {
        self.length - self.viewport_height
    }

    pub fn is_traversal_complete(&self) -> bool {
        self.offset >= self.traversal_offset()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn segments(&self) -> &[WorldSegment] {
        &self.segments
    }

    /// Index of the segment under the middle of the viewport
    pub fn segment_index(&self) -> usize {
        let probe = self.offset + self.viewport_height * 0.5;
        // Final segment extends to the world's end
        self.segments
            .partition_point(|s| s.end_offset <= probe)
            .min(self.segments.len() - 1)
    }

    pub fn current_segment(&self) -> &WorldSegment {
        &self.segments[self.segment_index()]
    }

    /// How far the viewport midpoint is through the active segment, in [0, 1]
    pub fn segment_progress(&self) -> f32 {
        let seg = self.current_segment();
        let probe = self.offset + self.viewport_height * 0.5;
        ((probe - seg.start_offset) / seg.length()).clamp(0.0, 1.0)
    }

    /// Fraction of the route completed, in [0, 1]
    pub fn mission_progress(&self) -> f32 {
        (self.offset / self.traversal_offset()).clamp(0.0, 1.0)
    }

    pub fn distance_km(&self) -> f32 {
        self.offset / self.units_per_km
    }

    pub fn total_distance_km(&self) -> f32 {
        self.traversal_offset() / self.units_per_km
    }

    pub fn remaining_km(&self) -> f32 {
        (self.total_distance_km() - self.distance_km()).max(0.0)
    }

    /// Seconds until traversal at the current scroll rate
    pub fn eta_seconds(&self) -> f32 {
        (self.traversal_offset() - self.offset).max(0.0) / self.scroll_speed
    }
}

/// Build contiguous segments from `(name, length, spawn_rate, kinds)` rows
pub fn contiguous_segments<I>(rows: I) -> Vec<WorldSegment>
where
    I: IntoIterator<Item = (String, f32, f32, Vec<ProjectileKind>)>,
{
    let mut start = 0.0;
    rows.into_iter()
        .map(|(name, length, spawn_rate_base, allowed_kinds)| {
            let seg = WorldSegment {
                name,
                spawn_rate_base,
                allowed_kinds,
                start_offset: start,
                end_offset: start + length,
            };
            start = seg.end_offset;
            seg
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ProjectileKind::*;

    fn three_segments() -> Vec<WorldSegment> {
        contiguous_segments([
            ("Coast".to_string(), 1000.0, 0.5, vec![Standard]),
            ("Hills".to_string(), 1000.0, 1.0, vec![Standard, Fast]),
            ("Peaks".to_string(), 1000.0, 1.5, vec![Heavy, Sniper]),
        ])
    }

    fn world() -> WorldPartition {
        WorldPartition::new(three_segments(), 3000.0, 400.0, 100.0, 100.0).unwrap()
    }

    #[test]
    fn test_segment_lookup_uses_viewport_midpoint() {
        let mut w = world();
        assert_eq!(w.segment_index(), 0);
        assert!((w.segment_progress() - 0.2).abs() < 1e-5);

        // Midpoint at 1000 is the first unit of Hills
        w.scroll(8.0);
        assert_eq!(w.offset(), 800.0);
        assert_eq!(w.current_segment().name, "Hills");
        assert_eq!(w.segment_progress(), 0.0);
    }

    #[test]
    fn test_traversal_completion_is_idempotent() {
        let mut w = world();
        assert!(!w.is_traversal_complete());
        w.scroll(25.0);
        assert!(!w.is_traversal_complete());
        w.scroll(1.0);
        assert!(w.is_traversal_complete());
        assert_eq!(w.offset(), 2600.0);
        w.scroll(10.0);
        assert!(w.is_traversal_complete());
        assert!(w.is_traversal_complete());
        assert_eq!(w.mission_progress(), 1.0);
        assert_eq!(w.eta_seconds(), 0.0);
        // Final segment covers the tail
        assert_eq!(w.current_segment().name, "Peaks");
    }

    #[test]
    fn test_distance_and_eta() {
        let mut w = world();
        w.scroll(13.0);
        assert!((w.distance_km() - 13.0).abs() < 1e-4);
        assert!((w.total_distance_km() - 26.0).abs() < 1e-4);
        assert!((w.remaining_km() - 13.0).abs() < 1e-4);
        assert!((w.eta_seconds() - 13.0).abs() < 1e-4);
        assert!((w.mission_progress() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_gap() {
        let mut segs = three_segments();
        segs[1].start_offset += 5.0;
        let err = WorldPartition::new(segs, 3000.0, 400.0, 100.0, 100.0).unwrap_err();
        assert!(matches!(err, ConfigError::SegmentGap { index: 1, .. }));
    }

    #[test]
    fn test_rejects_empty_roster_and_short_route() {
        let mut segs = three_segments();
        segs[2].allowed_kinds.clear();
        assert!(matches!(
            WorldPartition::new(segs, 3000.0, 400.0, 100.0, 100.0),
            Err(ConfigError::EmptyRoster { index: 2, .. })
        ));

        assert!(matches!(
            WorldPartition::new(three_segments(), 4000.0, 400.0, 100.0, 100.0),
            Err(ConfigError::RouteLengthMismatch { .. })
        ));
        assert!(matches!(
            WorldPartition::new(Vec::new(), 3000.0, 400.0, 100.0, 100.0),
            Err(ConfigError::EmptyRoute)
        ));
        assert!(matches!(
            WorldPartition::new(three_segments(), 3000.0, 3000.0, 100.0, 100.0),
            Err(ConfigError::WorldTooShort { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_kind() {
        let mut segs = three_segments();
        segs[1].allowed_kinds.push(Fast);
        assert!(matches!(
            WorldPartition::new(segs, 3000.0, 400.0, 100.0, 100.0),
            Err(ConfigError::DuplicateKind { index: 1, kind: Fast })
        ));
    }

    proptest! {
        #[test]
        fn prop_progress_in_unit_range(steps in proptest::collection::vec(0.0f32..3.0, 0..40)) {
            let mut w = world();
            for dt in steps {
                w.scroll(dt);
                let p = w.segment_progress();
                prop_assert!((0.0..=1.0).contains(&p));
                prop_assert!((0.0..=1.0).contains(&w.mission_progress()));
                prop_assert!(w.segment_index() < 3);
            }
        }
    }
}
