// src/aggregate/mod.rs
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};
use tracing::debug;

use crate::corpus::SongRecord;

/// Dimension records are grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Artist,
    ReleaseYear,
    Language,
}

impl GroupKey {
    /// Group value for a record; `None` for an unknown release year, which never
    /// forms a group.
    pub fn value(&self, record: &SongRecord) -> Option<GroupValue> {
        match self {
            GroupKey::Artist => Some(GroupValue::Text(record.artist.clone())),
            GroupKey::Language => Some(GroupValue::Text(record.language.clone())),
            GroupKey::ReleaseYear => record.release_year.year().map(GroupValue::Year),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupValue {
    Year(i32),
    Text(String),
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Year(y) => write!(f, "{}", y),
            GroupValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for GroupValue {
    fn from(s: &str) -> Self {
        GroupValue::Text(s.to_string())
    }
}

impl From<i32> for GroupValue {
    fn from(y: i32) -> Self {
        GroupValue::Year(y)
    }
}

/// Numeric record fields that can be averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    SwearRatio,
    ReadabilityGrade,
}

impl Metric {
    pub fn column(&self) -> &'static str {
        match self {
            Metric::SwearRatio => "swear_ratio",
            Metric::ReadabilityGrade => "readability_grade",
        }
    }

    pub fn value(&self, record: &SongRecord) -> f64 {
        match self {
            Metric::SwearRatio => record.swear_ratio,
            Metric::ReadabilityGrade => record.readability_grade as f64,
        }
    }
}

/// Which records take part in an aggregation. The default selects everything.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    with_lyrics: bool,
    language: Option<String>,
    known_year: bool,
    artists: Option<HashSet<String>>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_lyrics(mut self) -> Self {
        self.with_lyrics = true;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn known_year(mut self) -> Self {
        self.known_year = true;
        self
    }

    pub fn artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artists = Some(artists.into_iter().map(Into::into).collect());
        self
    }

    pub fn matches(&self, record: &SongRecord) -> bool {
        (!self.with_lyrics || record.has_lyrics)
            && self.language.as_ref().map_or(true, |l| &record.language == l)
            && (!self.known_year || record.release_year.is_known())
            && self
                .artists
                .as_ref()
                .map_or(true, |set| set.contains(&record.artist))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: GroupValue,
    pub count: usize,
    /// Metric column → mean over the group.
    #[serde(flatten)]
    pub means: BTreeMap<&'static str, f64>,
}

impl AggregateRow {
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.means.get(metric.column()).copied()
    }
}

/// Rows for one grouping, in the order each key was first seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    pub key: GroupKey,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    /// Group the records picked by `selection` and average `metrics` per group.
    pub fn build(
        records: &[SongRecord],
        key: GroupKey,
        selection: &Selection,
        metrics: &[Metric],
    ) -> Self {
        Self::build_where(records, key, |r| selection.matches(r), metrics)
    }

    /// Same as [`AggregateTable::build`] with an arbitrary predicate.
    pub fn build_where<P>(records: &[SongRecord], key: GroupKey, predicate: P, metrics: &[Metric]) -> Self
    where
        P: Fn(&SongRecord) -> bool,
    {
        let mut slots: HashMap<GroupValue, usize> = HashMap::new();
        let mut groups: Vec<(GroupValue, usize, Vec<f64>)> = Vec::new();

        for record in records.iter().filter(|r| predicate(r)) {
            let Some(value) = key.value(record) else {
                continue;
            };
            let idx = *slots.entry(value.clone()).or_insert_with(|| {
                groups.push((value, 0, vec![0.0; metrics.len()]));
                groups.len() - 1
            });
            let (_, count, sums) = &mut groups[idx];
            *count += 1;
            for (sum, metric) in sums.iter_mut().zip(metrics) {
                *sum += metric.value(record);
            }
        }

        let rows = groups
            .into_iter()
            .map(|(key, count, sums)| AggregateRow {
                means: metrics
                    .iter()
                    .zip(sums)
                    .map(|(m, sum)| (m.column(), sum / count as f64))
                    .collect(),
                key,
                count,
            })
            .collect::<Vec<_>>();
        debug!(key = ?key, groups = rows.len(), "aggregated");
        Self { key, rows }
    }

    /// Count distinct `field` values per group, e.g. albums per artist.
    pub fn distinct_count<F>(
        records: &[SongRecord],
        key: GroupKey,
        selection: &Selection,
        field: F,
    ) -> Self
    where
        F: Fn(&SongRecord) -> &str,
    {
        let mut slots: HashMap<GroupValue, usize> = HashMap::new();
        let mut groups: Vec<(GroupValue, HashSet<&str>)> = Vec::new();

        for record in records.iter().filter(|r| selection.matches(r)) {
            let Some(value) = key.value(record) else {
                continue;
            };
            let idx = *slots.entry(value.clone()).or_insert_with(|| {
                groups.push((value, HashSet::new()));
                groups.len() - 1
            });
            groups[idx].1.insert(field(record));
        }

        let rows = groups
            .into_iter()
            .map(|(key, distinct)| AggregateRow {
                key,
                count: distinct.len(),
                means: BTreeMap::new(),
            })
            .collect();
        Self { key, rows }
    }

    pub fn get(&self, key: &GroupValue) -> Option<&AggregateRow> {
        self.rows.iter().find(|r| &r.key == key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// The `n` largest groups by count. Equal counts keep first-seen order.
    pub fn top_by_count(&self, n: usize) -> Vec<AggregateRow> {
        let mut rows = self.rows.clone();
        // stable: ties stay in insertion order
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows.truncate(n);
        rows
    }

    /// Rows ordered by key: years ascending, text lexicographically.
    pub fn sorted_by_key(&self) -> Vec<AggregateRow> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::ReleaseYear;

    fn song(artist: &str, album: &str, year: ReleaseYear, language: &str, swear: f64, grade: u32) -> SongRecord {
        let mut r = SongRecord::new(artist, album, "s", year, "some lyrics here");
        r.language = language.to_string();
        r.swear_ratio = swear;
        r.readability_grade = grade;
        r
    }

    fn records() -> Vec<SongRecord> {
        vec![
            song("B", "b1", ReleaseYear::Known(2001), "English", 0.2, 4),
            song("A", "a1", ReleaseYear::Unknown, "English", 0.0, 2),
            song("C", "c1", ReleaseYear::Known(1999), "German", 0.1, 6),
            song("A", "a2", ReleaseYear::Known(2001), "English", 0.4, 6),
            song("B", "b1", ReleaseYear::Known(1999), "none", 0.0, 1),
            song("C", "c2", ReleaseYear::Known(2001), "English", 0.0, 3),
        ]
    }

    #[test]
    fn groups_in_first_seen_order_with_means() {
        let table = AggregateTable::build(
            &records(),
            GroupKey::Artist,
            &Selection::all(),
            &[Metric::SwearRatio, Metric::ReadabilityGrade],
        );
        let keys: Vec<String> = table.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
        let a = table.get(&"A".into()).unwrap();
        assert_eq!(a.count, 2);
        assert!((a.mean(Metric::SwearRatio).unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(a.mean(Metric::ReadabilityGrade), Some(4.0));
        assert_eq!(table.total_count(), 6);
    }

    #[test]
    fn year_groups_skip_unknown() {
        let table = AggregateTable::build(&records(), GroupKey::ReleaseYear, &Selection::all(), &[]);
        assert_eq!(table.total_count(), 5);
        assert!(table.rows.iter().all(|r| matches!(r.key, GroupValue::Year(_))));
        let sorted: Vec<GroupValue> = table.sorted_by_key().into_iter().map(|r| r.key).collect();
        assert_eq!(sorted, vec![GroupValue::Year(1999), GroupValue::Year(2001)]);
        assert_eq!(table.get(&2001.into()).unwrap().count, 3);
    }

    #[test]
    fn selection_filters() {
        let selection = Selection::all().with_lyrics().language("English").known_year();
        let table = AggregateTable::build(&records(), GroupKey::Language, &selection, &[Metric::SwearRatio]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].count, 3);

        let only_c = Selection::all().artists(["C"]);
        let table = AggregateTable::build(&records(), GroupKey::Artist, &only_c, &[]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].count, 2);
    }

    #[test]
    fn top_by_count_breaks_ties_by_first_seen() {
        // every artist has 2 songs
        let table = AggregateTable::build(&records(), GroupKey::Artist, &Selection::all(), &[]);
        let top: Vec<String> = table.top_by_count(2).iter().map(|r| r.key.to_string()).collect();
        assert_eq!(top, vec!["B", "A"]);

        let mut more = records();
        more.push(song("C", "c3", ReleaseYear::Known(2002), "English", 0.0, 1));
        let table = AggregateTable::build(&more, GroupKey::Artist, &Selection::all(), &[]);
        let top: Vec<String> = table.top_by_count(3).iter().map(|r| r.key.to_string()).collect();
        assert_eq!(top, vec!["C", "B", "A"]);
    }

    #[test]
    fn distinct_albums_per_artist() {
        let table = AggregateTable::distinct_count(&records(), GroupKey::Artist, &Selection::all(), |r| {
            r.album.as_str()
        });
        assert_eq!(table.get(&"A".into()).unwrap().count, 2);
        assert_eq!(table.get(&"B".into()).unwrap().count, 1);
        assert_eq!(table.get(&"C".into()).unwrap().count, 2);
    }

    #[test]
    fn empty_input() {
        let table = AggregateTable::build(&[], GroupKey::Artist, &Selection::all(), &[Metric::SwearRatio]);
        assert!(table.is_empty());
        assert!(table.top_by_count(10).is_empty());
    }

    #[test]
    fn rows_serialize_flat() {
        let table = AggregateTable::build(&records(), GroupKey::ReleaseYear, &Selection::all(), &[Metric::SwearRatio]);
        let json = serde_json::to_value(&table.rows[0]).unwrap();
        assert_eq!(json["key"], serde_json::json!(2001));
        assert_eq!(json["count"], serde_json::json!(3));
        assert!(json.get("swear_ratio").is_some());
    }
}
