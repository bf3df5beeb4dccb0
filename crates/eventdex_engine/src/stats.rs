use std::collections::{HashMap, HashSet};
use std::fmt;

use eventdex_core::{Gender, Record};

use crate::SpeciesCatalog;

const MOST_COLLECTED_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesCount {
    pub species_name: String,
    pub count: usize,
}

/// Summary of a user's stored collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStats {
    pub total: usize,
    /// Distinct forms; gendered species count male and female separately.
    pub unique_forms: usize,
    pub total_event_species: usize,
    pub completion_percent: f64,
    pub males: usize,
    pub females: usize,
    pub unknown: usize,
    pub average_iv: f64,
    pub highest_iv: f64,
    pub lowest_iv: f64,
    pub lowest_non_zero_iv: f64,
    pub most_collected: Vec<SpeciesCount>,
}

/// Computes collection statistics, `None` for an empty collection.
pub fn collection_stats(
    records: &[Record],
    catalog: &dyn SpeciesCatalog,
) -> Option<CollectionStats> {
    if records.is_empty() {
        return None;
    }

    let mut forms: HashSet<(&str, Option<Gender>)> = HashSet::new();
    for record in records {
        let gendered = catalog.has_gender_difference(record.species_name())
            && matches!(record.gender(), Gender::Male | Gender::Female);
        let gender = gendered.then_some(record.gender());
        forms.insert((record.species_name(), gender));
    }

    let count_gender = |gender: Gender| records.iter().filter(|r| r.gender() == gender).count();

    let ivs: Vec<f64> = records.iter().map(Record::iv_percent).collect();
    let average_iv = ivs.iter().sum::<f64>() / ivs.len() as f64;
    let highest_iv = ivs.iter().copied().fold(f64::MIN, f64::max);
    let lowest_iv = ivs.iter().copied().fold(f64::MAX, f64::min);
    let lowest_non_zero_iv = ivs
        .iter()
        .copied()
        .filter(|iv| *iv > 0.0)
        .fold(None, |lowest: Option<f64>, iv| {
            Some(lowest.map_or(iv, |current| current.min(iv)))
        })
        .unwrap_or(0.0);

    let total_event_species = catalog.total_event_species_count();
    let completion_percent = if total_event_species > 0 {
        forms.len() as f64 / total_event_species as f64 * 100.0
    } else {
        0.0
    };

    Some(CollectionStats {
        total: records.len(),
        unique_forms: forms.len(),
        total_event_species,
        completion_percent,
        males: count_gender(Gender::Male),
        females: count_gender(Gender::Female),
        unknown: count_gender(Gender::Unknown),
        average_iv,
        highest_iv,
        lowest_iv,
        lowest_non_zero_iv,
        most_collected: most_collected(records),
    })
}

/// Top species by count; ties keep the order of first appearance.
fn most_collected(records: &[Record]) -> Vec<SpeciesCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let name = record.species_name();
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }

    let mut ranked: Vec<SpeciesCount> = order
        .into_iter()
        .map(|name| SpeciesCount {
            species_name: name.to_string(),
            count: counts[name],
        })
        .collect();
    // Stable sort keeps first-appearance order among equal counts.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(MOST_COLLECTED_LIMIT);
    ranked
}

impl fmt::Display for CollectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Collection Overview")?;
        writeln!(f, "Total Event Shinies: {}", self.total)?;
        writeln!(
            f,
            "Event Dex: {}/{} ({:.1}%)",
            self.unique_forms, self.total_event_species, self.completion_percent
        )?;
        writeln!(f, "Males: {}", self.males)?;
        writeln!(f, "Females: {}", self.females)?;
        writeln!(f, "Unknown: {}", self.unknown)?;
        writeln!(f)?;
        writeln!(f, "IV Statistics")?;
        writeln!(f, "Average: {:.2}%", self.average_iv)?;
        writeln!(f, "Highest: {:.2}%", self.highest_iv)?;
        writeln!(f, "Lowest: {:.2}%", self.lowest_iv)?;
        write!(f, "Lowest Non-Zero: {:.2}%", self.lowest_non_zero_iv)?;
        if !self.most_collected.is_empty() {
            write!(f, "\n\nMost Collected")?;
            for (rank, entry) in self.most_collected.iter().enumerate() {
                write!(f, "\n{}. {}: {}x", rank + 1, entry.species_name, entry.count)?;
            }
        }
        Ok(())
    }
}
