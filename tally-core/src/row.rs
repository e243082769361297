//! Row types flowing through the pipeline.
//!
//! Both row kinds keep their fields in insertion order: a [`RawRow`] in the
//! source CSV column order, a [`CanonicalRow`] in the order the normalizer
//! emitted its columns.

/// One input CSV line keyed by the source header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    /// Zip a header row with one record. Extra values without a header are ignored.
    pub fn from_record<'a, H, V>(headers: H, values: V) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        let fields = headers
            .into_iter()
            .zip(values)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key`, treating a missing column as empty.
    pub fn value_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A normalized row ready for the sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRow {
    fields: Vec<(String, String)>,
}

impl CanonicalRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CanonicalRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = CanonicalRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Canonical rows of one input file, in input order minus dropped rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCollection {
    rows: Vec<CanonicalRow>,
}

impl RowCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: CanonicalRow) {
        self.rows.push(row);
    }

    /// Union of all canonical keys, in first-seen order.
    pub fn header(&self) -> Vec<&str> {
        let mut header: Vec<&str> = Vec::new();
        for key in self.rows.iter().flat_map(|r| r.keys()) {
            if !header.contains(&key) {
                header.push(key);
            }
        }
        header
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<CanonicalRow>> for RowCollection {
    fn from(rows: Vec<CanonicalRow>) -> Self {
        Self { rows }
    }
}

impl FromIterator<CanonicalRow> for RowCollection {
    fn from_iter<I: IntoIterator<Item = CanonicalRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RowCollection {
    type Item = &'a CanonicalRow;
    type IntoIter = std::slice::Iter<'a, CanonicalRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
