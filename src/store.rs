use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use crate::platform::Platform;
use crate::record::{RawRecord, Snapshot};
use crate::DateRange;

/// Deduplicated, time-ordered snapshots from one ingestion of the raw log.
///
/// Built once and never mutated; range restriction produces a new store.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshots: Vec<Snapshot>,
    by_entity: HashMap<String, Vec<usize>>,
    entity_order: Vec<String>,
    current_date: Option<NaiveDate>,
}

impl SnapshotStore {
    /// Builds a store from raw rows in log order.
    ///
    /// Rows sharing `(entity, day)` collapse to the last-arriving one. Dated
    /// snapshots sort ascending by day with arrival order breaking ties;
    /// undated snapshots follow in arrival order.
    pub fn ingest(raw_rows: &[RawRecord], platforms: &[Platform]) -> Self {
        let mut kept: Vec<Snapshot> = Vec::with_capacity(raw_rows.len());
        let mut slots: HashMap<(String, Option<NaiveDate>), usize> = HashMap::new();
        let mut entity_order: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut skipped = 0usize;
        let mut collapsed = 0usize;

        for (arrival, row) in raw_rows.iter().enumerate() {
            let Some(snapshot) = Snapshot::from_raw(row, arrival, platforms) else {
                skipped += 1;
                continue;
            };

            if seen.insert(snapshot.entity_id.clone()) {
                entity_order.push(snapshot.entity_id.clone());
            }

            let key = (snapshot.entity_id.clone(), snapshot.date);
            match slots.get(&key) {
                Some(&slot) => {
                    kept[slot] = snapshot;
                    collapsed += 1;
                }
                None => {
                    slots.insert(key, kept.len());
                    kept.push(snapshot);
                }
            }
        }

        if skipped > 0 {
            tracing::warn!(skipped, "raw rows without an entity id were dropped");
        }

        let store = Self::from_snapshots(kept, entity_order);
        let undated = store.undated().count();
        tracing::debug!(collapsed, undated, "deduplicated snapshot log");
        tracing::info!(
            rows = raw_rows.len(),
            snapshots = store.len(),
            entities = store.entity_order.len(),
            "snapshot store built"
        );
        store
    }

    fn from_snapshots(mut snapshots: Vec<Snapshot>, entity_order: Vec<String>) -> Self {
        // Undated rows sort after every dated one; arrival breaks ties.
        snapshots.sort_by_key(|snapshot| (snapshot.date.is_none(), snapshot.date, snapshot.arrival));

        let mut by_entity: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, snapshot) in snapshots.iter().enumerate() {
            by_entity
                .entry(snapshot.entity_id.clone())
                .or_default()
                .push(idx);
        }

        let entity_order = entity_order
            .into_iter()
            .filter(|entity| by_entity.contains_key(entity))
            .collect();

        let current_date = snapshots.iter().filter_map(|snapshot| snapshot.date).max();

        Self {
            snapshots,
            by_entity,
            entity_order,
            current_date,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Entity ids in the order they first appeared in the raw log.
    pub fn entities(&self) -> &[String] {
        &self.entity_order
    }

    /// Display name from the entity's most recent snapshot.
    pub fn name_of(&self, entity_id: &str) -> Option<&str> {
        self.entity_snapshots(entity_id)
            .filter(|snapshot| !snapshot.name.is_empty())
            .last()
            .map(|snapshot| snapshot.name.as_str())
    }

    /// Latest snapshot day across the whole store.
    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current_date
    }

    /// Earliest and latest snapshot days, if any snapshot is dated.
    pub fn date_span(&self) -> Option<DateRange> {
        let mut dates = self.snapshots.iter().filter_map(|snapshot| snapshot.date);
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), day| (lo.min(day), hi.max(day)));
        Some(DateRange::new(start, end))
    }

    /// The entity's snapshot at the store-wide current date.
    ///
    /// Every entity is read at the same day so "current" views line up; an
    /// entity with no row on that day has no current snapshot.
    pub fn latest_for(&self, entity_id: &str) -> Option<&Snapshot> {
        let current = self.current_date?;
        self.entity_snapshots(entity_id)
            .find(|snapshot| snapshot.date == Some(current))
    }

    /// All snapshots at the current date, in first-seen entity order.
    pub fn current_snapshots(&self) -> Vec<&Snapshot> {
        self.entity_order
            .iter()
            .filter_map(|entity| self.latest_for(entity))
            .collect()
    }

    /// Dated snapshots of the entity that carry the platform, oldest first.
    pub fn history_for(&self, entity_id: &str, platform: &str) -> Vec<&Snapshot> {
        self.entity_snapshots(entity_id)
            .filter(|snapshot| snapshot.date.is_some() && snapshot.platform(platform).is_some())
            .collect()
    }

    pub fn all_at_or_before(
        &self,
        entity_id: &str,
        platform: &str,
        timestamp: NaiveDate,
    ) -> Vec<&Snapshot> {
        self.history_for(entity_id, platform)
            .into_iter()
            .filter(|snapshot| snapshot.date.is_some_and(|day| day <= timestamp))
            .collect()
    }

    /// Latest dated snapshot of the entity at or before `as_of`, any platform.
    pub fn latest_at_or_before(&self, entity_id: &str, as_of: NaiveDate) -> Option<&Snapshot> {
        self.entity_snapshots(entity_id)
            .filter(|snapshot| snapshot.date.is_some_and(|day| day <= as_of))
            .last()
    }

    /// Rows whose date could not be resolved, kept for display only.
    pub fn undated(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.date.is_none())
    }

    /// A new store holding only dated snapshots inside `range`.
    pub fn within(&self, range: DateRange) -> SnapshotStore {
        if range.is_empty() {
            return SnapshotStore::default();
        }
        let snapshots = self
            .snapshots
            .iter()
            .filter(|snapshot| snapshot.date.is_some_and(|day| range.contains(day)))
            .cloned()
            .collect();
        Self::from_snapshots(snapshots, self.entity_order.clone())
    }

    fn entity_snapshots(&self, entity_id: &str) -> impl Iterator<Item = &Snapshot> {
        self.by_entity
            .get(entity_id)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&idx| &self.snapshots[idx])
    }
}
