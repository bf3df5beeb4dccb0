use eventdex_core::{ExtractedPage, Gender, Identifier, Record};
use eventdex_logging::{dex_debug, dex_trace};
use regex::Regex;

use crate::SpeciesCatalog;

/// Marker glyph of a specially flagged inventory line.
pub const SENTINEL: char = '✨';

pub trait RecordExtractor: Send + Sync {
    /// Raw candidate records of one page, in line order, before eligibility filtering.
    fn extract(&self, page: &str) -> Vec<Record>;

    /// Number of lines carrying the sentinel glyph.
    fn candidate_lines(&self, page: &str) -> usize {
        page.lines().filter(|line| line.contains(SENTINEL)).count()
    }
}

/// Line-oriented extractor for listing pages such as
/// ``✨ Pikachu <:male:123> Lvl. 20 • 100.0% `123456` ``.
///
/// Each field is matched independently; a line is only dropped when the
/// identifier or the species name cannot be recovered.
#[derive(Debug, Clone)]
pub struct LinePatternExtractor {
    id: Regex,
    name_before_gender: Regex,
    name_fallback: Regex,
    gender: Regex,
    level: Regex,
    iv: Regex,
    icon: Regex,
}

impl Default for LinePatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinePatternExtractor {
    pub fn new() -> Self {
        Self {
            id: compile(r"\*?`\s*(\d+)\s*`\*?"),
            name_before_gender: compile(r"(?:✨|>)\s*(.+?)\s*<:(?:male|female|unknown):"),
            name_fallback: compile(r"✨\s*([^•]+?)\s*(?:•|Lvl\.|`|$)"),
            gender: compile(r"<:(male|female|unknown):"),
            level: compile(r"Lvl\.\s*(\d+)"),
            iv: compile(r"•\s*(\d+(?:\.\d+)?)\s*%"),
            icon: compile(r"<a?:[^:<>]*:\d*>"),
        }
    }

    fn parse_line(&self, line: &str) -> Option<Record> {
        let Some(identifier) = self.identifier(line) else {
            dex_debug!("skipping listing line without identifier: {line:?}");
            return None;
        };
        let Some(species_name) = self.species_name(line) else {
            dex_debug!("skipping listing line {identifier} without species name");
            return None;
        };

        let gender = self
            .gender
            .captures(line)
            .map(|caps| Gender::from_icon(&caps[1]))
            .unwrap_or_default();
        let level = self
            .level
            .captures(line)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .unwrap_or(Record::DEFAULT_LEVEL);
        let iv_percent = self
            .iv
            .captures(line)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .unwrap_or(0.0);

        Some(
            Record::new(identifier, species_name, gender)
                .with_level(level)
                .with_iv_percent(iv_percent),
        )
    }

    fn identifier(&self, line: &str) -> Option<Identifier> {
        self.id
            .captures(line)
            .and_then(|caps| caps[1].parse::<Identifier>().ok())
    }

    fn species_name(&self, line: &str) -> Option<String> {
        // Styled identifiers would otherwise leak into the fallback capture.
        let without_ids = self.id.replace_all(line, " ");
        let raw = self
            .name_before_gender
            .captures(&without_ids)
            .or_else(|| self.name_fallback.captures(&without_ids))
            .map(|caps| caps[1].to_string())?;

        let stripped = self.icon.replace_all(&raw, " ").replace(SENTINEL, " ");
        let name = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        (!name.is_empty()).then_some(name)
    }

    /// First styled identifier of every line that has one, sentinel or not.
    pub fn identifiers(&self, page: &str) -> Vec<Identifier> {
        page.lines().filter_map(|line| self.identifier(line)).collect()
    }
}

impl RecordExtractor for LinePatternExtractor {
    fn extract(&self, page: &str) -> Vec<Record> {
        page.lines()
            .filter(|line| line.contains(SENTINEL))
            .filter_map(|line| self.parse_line(line))
            .collect()
    }
}

/// Extraction followed by the eligibility filter.
pub fn extract_page(
    extractor: &dyn RecordExtractor,
    catalog: &dyn SpeciesCatalog,
    page: &str,
) -> ExtractedPage {
    let candidate_lines = extractor.candidate_lines(page);
    let records: Vec<Record> = extractor
        .extract(page)
        .into_iter()
        .filter(|record| {
            let eligible = catalog.is_event_species(record.species_name());
            if !eligible {
                dex_trace!("{} is not an event species", record.species_name());
            }
            eligible
        })
        .collect();
    ExtractedPage {
        candidate_lines,
        records,
    }
}

/// Identifiers listed on a page, used when removing by page.
pub fn ids_in_page(page: &str) -> Vec<Identifier> {
    LinePatternExtractor::new().identifiers(page)
}

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("invalid built-in pattern {pattern:?}: {err}"),
    }
}
