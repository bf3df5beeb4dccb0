use std::collections::HashMap;

/// Registry of the species that count toward event tracking.
pub trait SpeciesCatalog: Send + Sync {
    fn is_event_species(&self, name: &str) -> bool;
    fn has_gender_difference(&self, name: &str) -> bool;
    fn total_event_species_count(&self) -> usize;
}

/// In-memory catalog. Names compare case-insensitively with collapsed whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    /// Normalized name -> has gender difference.
    species: HashMap<String, bool>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_species<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for name in names {
            catalog.insert(name.as_ref(), false);
        }
        catalog
    }

    pub fn insert(&mut self, name: &str, gender_difference: bool) {
        let key = normalize(name);
        if key.is_empty() {
            return;
        }
        let entry = self.species.entry(key).or_insert(false);
        *entry |= gender_difference;
    }

    /// Parses one species per line; a trailing `,gender` marks a gender difference.
    /// Blank lines and `#` comments are ignored.
    pub fn parse(text: &str) -> Self {
        let mut catalog = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, ',');
            let name = parts.next().unwrap_or_default();
            let gender_difference = parts
                .next()
                .map(|flag| flag.trim().eq_ignore_ascii_case("gender"))
                .unwrap_or(false);
            catalog.insert(name, gender_difference);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl SpeciesCatalog for StaticCatalog {
    fn is_event_species(&self, name: &str) -> bool {
        self.species.contains_key(&normalize(name))
    }

    fn has_gender_difference(&self, name: &str) -> bool {
        self.species.get(&normalize(name)).copied().unwrap_or(false)
    }

    fn total_event_species_count(&self) -> usize {
        self.species.len()
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
