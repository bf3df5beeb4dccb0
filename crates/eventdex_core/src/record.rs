use std::fmt;

/// Per-specimen identifier, stable within one user's inventory.
pub type Identifier = u64;
pub type UserId = u64;
/// Identifier of a listing page (the message that carries it).
pub type SourceId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Maps a gender-icon name (`male`, `female`, ...) onto a gender.
    pub fn from_icon(name: &str) -> Self {
        match name {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collectible specimen. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    identifier: Identifier,
    species_name: String,
    gender: Gender,
    level: u32,
    iv_percent: f64,
}

impl Record {
    pub const DEFAULT_LEVEL: u32 = 1;

    pub fn new(identifier: Identifier, species_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            identifier,
            species_name: species_name.into(),
            gender,
            level: Self::DEFAULT_LEVEL,
            iv_percent: 0.0,
        }
    }

    /// Levels below 1 are raised to 1.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    /// Clamped into `[0, 100]`; NaN becomes 0.
    pub fn with_iv_percent(mut self, iv_percent: f64) -> Self {
        self.iv_percent = if iv_percent.is_nan() {
            0.0
        } else {
            iv_percent.clamp(0.0, 100.0)
        };
        self
    }

    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    pub fn species_name(&self) -> &str {
        &self.species_name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn iv_percent(&self) -> f64 {
        self.iv_percent
    }
}

/// Result of running one page through extraction and the eligibility filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedPage {
    /// Lines carrying the sentinel glyph, eligible or not.
    pub candidate_lines: usize,
    /// Eligible records in source line order.
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdentifier(pub String);

impl fmt::Display for InvalidIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid identifier {:?}", self.0)
    }
}

impl std::error::Error for InvalidIdentifier {}

/// Parses a whitespace separated identifier list. Any bad token rejects the whole list.
pub fn parse_identifiers(raw: &str) -> Result<Vec<Identifier>, InvalidIdentifier> {
    raw.split_whitespace()
        .map(|token| {
            token
                .parse::<Identifier>()
                .map_err(|_| InvalidIdentifier(token.to_string()))
        })
        .collect()
}
