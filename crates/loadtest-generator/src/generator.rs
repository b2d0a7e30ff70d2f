//! Cyclic record source.

use crate::record::{PlaneTemplate, Record};
use crate::sample_set::SampleSet;
use chrono::Utc;
use uuid::Uuid;

/// Hands out records built from a sample set in order, wrapping to the
/// first template after the last one.
pub struct SampleSource {
    /// Templates to replay
    set: SampleSet,
    /// Index of the next template (always `< set.len()`)
    index: usize,
}

impl SampleSource {
    /// Create a source that starts at the first template.
    pub fn new(set: SampleSet) -> Self {
        Self { set, index: 0 }
    }

    /// Start replay at `index` (taken modulo the set size).
    pub fn with_start_index(mut self, index: usize) -> Self {
        self.index = index % self.set.len();
        self
    }

    /// Index of the template the next record will be built from.
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Number of templates in the underlying set.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Always false; a `SampleSet` cannot be empty.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Return the next template and advance the cursor.
    pub fn next_template(&mut self) -> &PlaneTemplate {
        let index = self.index;
        self.index += 1;
        if self.index >= self.set.len() {
            self.index = 0;
        }
        &self.set.templates()[index]
    }

    /// Build the next record with a fresh id and the current time.
    pub fn next_record(&mut self) -> Record {
        let id = Uuid::new_v4();
        let ts = Utc::now();
        self.next_template().stamp(id, ts)
    }
}

impl Iterator for SampleSource {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn small_set() -> SampleSet {
        let planes = (0..3)
            .map(|i| PlaneTemplate {
                speed: 100.0 + i as f64,
                dist: 1.0,
                bearing: 0.0,
                rtid: i,
                orig: format!("orig-{i}"),
                dest: format!("dest-{i}"),
                secs_to_dep: -1,
                lon: i as f64,
                lat: -(i as f64),
            })
            .collect();
        SampleSet::new(planes).unwrap()
    }

    #[test]
    fn test_wraps_to_start() {
        let mut source = SampleSource::new(small_set());
        let rtids: Vec<i32> = (0..7).map(|_| source.next_template().rtid).collect();
        assert_eq!(rtids, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(source.current_index(), 1);
    }

    #[test]
    fn test_replay_reproduces_set_in_order() {
        let set = small_set();
        let mut source = SampleSource::new(set.clone());

        let n = 8;
        let records: Vec<Record> = source.by_ref().take(n).collect();
        assert_eq!(records.len(), n);

        for (i, record) in records.iter().enumerate() {
            let expected = set.get(i % set.len()).unwrap();
            assert!(record.matches_template(expected), "record {i} out of order");
        }
    }

    #[test]
    fn test_records_have_unique_ids() {
        let mut source = SampleSource::new(small_set());
        let ids: HashSet<Uuid> = (0..100).map(|_| source.next_record().id).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_start_index_wraps() {
        let source = SampleSource::new(small_set()).with_start_index(4);
        assert_eq!(source.current_index(), 1);
    }
}
