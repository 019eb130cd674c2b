// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cumulative baselines for stacked curves.
//!
//! Stacking only ever writes [`Sample::y0`](crate::model::Sample::y0); the
//! sampled densities are left untouched, so switching modes never requires
//! resampling.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::model::EntityRecord;

/// What stacking is driven by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackUse {
    /// Stack by value; only [`StackConfig::ALL`] stacks anything.
    #[default]
    Value,
    /// Stack within each categorical group.
    Property,
    /// Overlap every curve on the zero baseline.
    None,
}

/// Stacking configuration read from the marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackConfig {
    /// Stacking driver.
    pub use_: StackUse,
    /// Value-mode selector, or the grouping property name.
    pub which: String,
}

impl StackConfig {
    /// Value-mode selector that stacks every curve into one pile.
    pub const ALL: &'static str = "all";

    /// Stacks every curve into one pile.
    #[must_use]
    pub fn all() -> Self {
        Self {
            use_: StackUse::Value,
            which: String::from(Self::ALL),
        }
    }

    /// Stacks within groups of the named property.
    #[must_use]
    pub fn by_property(name: &str) -> Self {
        Self {
            use_: StackUse::Property,
            which: String::from(name),
        }
    }

    /// Disables stacking.
    #[must_use]
    pub fn none() -> Self {
        Self {
            use_: StackUse::None,
            which: String::new(),
        }
    }

    /// Returns whether this configuration produces any non-zero baseline.
    #[must_use]
    pub fn is_stacking(&self) -> bool {
        match self.use_ {
            StackUse::Value => self.which == Self::ALL,
            StackUse::Property => true,
            StackUse::None => false,
        }
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Reorders `records` for painting and assigns baselines.
///
/// Records are first restored to rank order. Property stacking then groups
/// them by [`EntityRecord::group`], groups ordered by first appearance in
/// rank order and rank order kept within a group, and accumulates each group
/// separately. Records with no points are skipped.
///
/// Reusing `scratch` across calls avoids reallocating the running baseline.
pub fn apply(records: &mut [EntityRecord], config: &StackConfig, scratch: &mut Vec<f64>) {
    for record in records.iter_mut() {
        for sample in &mut record.points {
            sample.y0 = 0.0;
        }
    }
    records.sort_by_key(|r| r.rank);

    match config.use_ {
        StackUse::Value if config.is_stacking() => accumulate(records, scratch),
        StackUse::Property => {
            let mut first_seen: HashMap<Option<String>, usize> = HashMap::new();
            for record in records.iter() {
                let next = first_seen.len();
                first_seen.entry(record.group.clone()).or_insert(next);
            }
            records.sort_by_cached_key(|r| first_seen.get(&r.group).copied().unwrap_or(0));

            let mut start = 0;
            while start < records.len() {
                let group = &records[start].group;
                let len = records[start..]
                    .iter()
                    .take_while(|r| &r.group == group)
                    .count();
                accumulate(&mut records[start..start + len], scratch);
                start += len;
            }
        }
        StackUse::Value | StackUse::None => {}
    }
}

fn accumulate(members: &mut [EntityRecord], base: &mut Vec<f64>) {
    let Some(len) = members.iter().map(|r| r.points.len()).max() else {
        return;
    };
    base.clear();
    base.resize(len, 0.0);
    for member in members {
        for (sample, b) in member.points.iter_mut().zip(base.iter_mut()) {
            sample.y0 = *b;
            *b += sample.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::model::{EntityKey, Sample};

    fn record(key: u64, rank: u32, ys: &[f64], group: Option<&str>) -> EntityRecord {
        let mut r = EntityRecord::new(EntityKey(key));
        r.rank = rank;
        let points = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| Sample::new(i as f64 + 1.0, y))
            .collect();
        r.points = points;
        r.group = group.map(String::from);
        r
    }

    fn keys(records: &[EntityRecord]) -> Vec<u64> {
        records.iter().map(|r| r.key.0).collect()
    }

    /// Checks that every record sits on the previous member's top, per run.
    fn assert_stacked(
        records: &[EntityRecord],
        same_pile: impl Fn(&EntityRecord, &EntityRecord) -> bool,
    ) {
        for (i, r) in records.iter().enumerate() {
            let below = records[..i].iter().rev().find(|p| same_pile(p, r));
            for (j, s) in r.points.iter().enumerate() {
                let expected = below.map_or(0.0, |b| b.points[j].top());
                assert!(
                    (s.y0 - expected).abs() < 1e-12,
                    "record {} sample {j}: y0 {} != {expected}",
                    r.key,
                    s.y0
                );
            }
        }
    }

    #[test]
    fn stacks_all_in_rank_order() {
        let mut records = vec![
            record(1, 2, &[1.0, 1.0, 1.0], None),
            record(2, 0, &[0.5, 2.0, 0.5], None),
            record(3, 1, &[0.25, 0.25, 3.0], None),
        ];
        apply(&mut records, &StackConfig::all(), &mut Vec::new());
        assert_eq!(keys(&records), [2, 3, 1]);
        assert_stacked(&records, |_, _| true);
        assert_eq!(records[2].points[1].y0, 2.25);
    }

    #[test]
    fn two_curves_stack_into_combined_height() {
        let mut records = vec![
            record(1, 0, &[1.0, 2.0, 3.0], None),
            record(2, 1, &[0.0, 1.0, 1.0], None),
        ];
        apply(&mut records, &StackConfig::all(), &mut Vec::new());

        let y0 = |r: &EntityRecord| r.points.iter().map(|s| s.y0).collect::<Vec<_>>();
        let tops = |r: &EntityRecord| r.points.iter().map(|s| s.top()).collect::<Vec<_>>();
        assert_eq!(y0(&records[0]), [0.0, 0.0, 0.0]);
        assert_eq!(y0(&records[1]), [1.0, 2.0, 3.0]);
        assert_eq!(tops(&records[0]), y0(&records[1]));
        assert_eq!(tops(&records[1]), [1.0, 3.0, 4.0]);
    }

    #[test]
    fn value_mode_other_than_all_does_not_stack() {
        let mut records = vec![
            record(1, 1, &[1.0, 1.0], None),
            record(2, 0, &[1.0, 1.0], None),
        ];
        let config = StackConfig {
            use_: StackUse::Value,
            which: String::from("none"),
        };
        apply(&mut records, &config, &mut Vec::new());
        assert_eq!(keys(&records), [2, 1]);
        assert!(records.iter().flat_map(|r| &r.points).all(|s| s.y0 == 0.0));
    }

    #[test]
    fn property_mode_stacks_within_groups() {
        // Rank order interleaves groups; groups keep first-appearance order.
        let mut records = vec![
            record(1, 0, &[1.0, 2.0], Some("asia")),
            record(2, 1, &[3.0, 1.0], Some("europe")),
            record(3, 2, &[0.5, 0.5], Some("asia")),
            record(4, 3, &[2.0, 2.0], Some("europe")),
            record(5, 4, &[1.0, 1.0], None),
        ];
        apply(&mut records, &StackConfig::by_property("region"), &mut Vec::new());
        assert_eq!(keys(&records), [1, 3, 2, 4, 5]);
        assert_stacked(&records, |a, b| a.group == b.group);
        assert_eq!(records[1].points[0].y0, 1.0);
        assert_eq!(records[2].points[0].y0, 0.0, "new group starts at zero");
        assert_eq!(records[3].points[1].y0, 1.0);
        assert_eq!(records[4].points[0].y0, 0.0);
    }

    #[test]
    fn switching_modes_preserves_raw_samples() {
        let mut records = vec![
            record(1, 0, &[1.0, 2.0, 3.0], Some("a")),
            record(2, 1, &[3.0, 1.0, 0.5], Some("b")),
            record(3, 2, &[0.5, 0.5, 0.5], Some("a")),
        ];
        let ys: Vec<Vec<f64>> = records
            .iter()
            .map(|r| r.points.iter().map(|s| s.y).collect())
            .collect();
        let mut scratch = Vec::new();

        apply(&mut records, &StackConfig::all(), &mut scratch);
        apply(&mut records, &StackConfig::by_property("p"), &mut scratch);
        apply(&mut records, &StackConfig::none(), &mut scratch);

        assert_eq!(keys(&records), [1, 2, 3], "none restores rank order");
        assert!(records.iter().flat_map(|r| &r.points).all(|s| s.y0 == 0.0));
        for (r, ys) in records.iter().zip(&ys) {
            let now: Vec<f64> = r.points.iter().map(|s| s.y).collect();
            assert_eq!(&now, ys);
        }
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let mut records = vec![
            record(1, 1, &[1.0, 2.0], Some("x")),
            record(2, 0, &[3.0, 1.0], Some("y")),
            record(3, 2, &[0.5, 0.5], Some("x")),
        ];
        let config = StackConfig::by_property("p");
        let mut scratch = Vec::new();
        apply(&mut records, &config, &mut scratch);
        let once = records.clone();
        apply(&mut records, &config, &mut scratch);
        assert_eq!(records, once);
    }

    #[test]
    fn degraded_records_are_skipped() {
        let mut records = vec![
            record(1, 0, &[1.0, 1.0], None),
            record(2, 1, &[], None),
            record(3, 2, &[2.0, 2.0], None),
        ];
        apply(&mut records, &StackConfig::all(), &mut Vec::new());
        assert!(records[1].points.is_empty());
        assert_eq!(records[2].points[0].y0, 1.0);
    }

    #[test]
    fn is_stacking() {
        assert!(StackConfig::all().is_stacking());
        assert!(StackConfig::by_property("region").is_stacking());
        assert!(!StackConfig::none().is_stacking());
        assert!(
            !StackConfig {
                use_: StackUse::Value,
                which: String::from("geo"),
            }
            .is_stacking()
        );
    }
}
