use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{
    dataset::{Column, Dataset},
    roles::RoleMap,
};

pub const TOP_VALUES: usize = 20;
pub const MIN_RARITY_THRESHOLD: usize = 2;
pub const RARITY_SHARE: f64 = 0.01;

/// Frequency table entries in report order (descending count).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopValues(pub Vec<(String, usize)>);

impl TopValues {
    pub fn get(&self, value: &str) -> Option<usize> {
        self.0
            .iter()
            .find(|(candidate, _)| candidate == value)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TopValues {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (value, count) in &self.0 {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

struct TopValuesVisitor;

impl<'de> Visitor<'de> for TopValuesVisitor {
    type Value = TopValues;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of value to count")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((value, count)) = access.next_entry::<String, usize>()? {
            entries.push((value, count));
        }
        Ok(TopValues(entries))
    }
}

impl<'de> Deserialize<'de> for TopValues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TopValuesVisitor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoricalProfile {
    pub top_values: TopValues,
    pub n_unique: usize,
    pub rare_below_threshold: usize,
    pub n_missing: usize,
}

pub fn analyze_categorical(
    dataset: &Dataset,
    roles: &RoleMap,
) -> BTreeMap<String, CategoricalProfile> {
    let threshold = rarity_threshold(dataset.row_count());
    roles
        .categorical
        .iter()
        .filter_map(|name| dataset.column(name))
        .map(|column| (column.name().to_string(), profile_column(column, threshold)))
        .collect()
}

/// Occurrence count below which a value counts as rare: 1% of rows, at least 2.
pub fn rarity_threshold(row_count: usize) -> usize {
    let scaled = (RARITY_SHARE * row_count as f64).round() as usize;
    scaled.max(MIN_RARITY_THRESHOLD)
}

fn profile_column(column: &Column, threshold: usize) -> CategoricalProfile {
    let counts = value_counts(column);
    let rare = counts.iter().filter(|(_, count)| *count < threshold).count();
    CategoricalProfile {
        n_unique: counts.len(),
        rare_below_threshold: rare,
        n_missing: column.missing_count(),
        top_values: TopValues(counts.into_iter().take(TOP_VALUES).collect()),
    }
}

/// Non-missing value counts, most frequent first; equal counts keep
/// first-seen order.
pub fn value_counts(column: &Column) -> Vec<(String, usize)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in column.present() {
        let key = value.as_display();
        match positions.get(&key) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
