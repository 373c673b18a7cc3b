//! The fixed set of scored axes.
//!
//! Judges report each dimension under a stable schema key; the enum is the
//! single table mapping dimension names to those keys and to the rubric the
//! prompt embeds, so parsing never falls back to ad hoc string matching.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Accuracy,
    Completeness,
    Utility,
    Structure,
    Language,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Accuracy,
        Dimension::Completeness,
        Dimension::Utility,
        Dimension::Structure,
        Dimension::Language,
    ];

    /// Key under which judges report this dimension in a score payload.
    pub fn schema_key(self) -> &'static str {
        match self {
            Dimension::Accuracy => "accuracy",
            Dimension::Completeness => "completeness",
            Dimension::Utility => "utility",
            Dimension::Structure => "structure",
            Dimension::Language => "language",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Accuracy => "Accuracy",
            Dimension::Completeness => "Completeness",
            Dimension::Utility => "Utility",
            Dimension::Structure => "Structure",
            Dimension::Language => "Language",
        }
    }

    /// Share of the default 100-point scheme.
    pub fn default_max_score(self) -> u32 {
        match self {
            Dimension::Accuracy => 30,
            Dimension::Completeness => 25,
            Dimension::Utility => 20,
            Dimension::Structure => 15,
            Dimension::Language => 10,
        }
    }

    /// What the judge is asked to assess on this axis.
    pub fn rubric(self) -> &'static str {
        match self {
            Dimension::Accuracy => {
                "factual correctness of the content; deduct for wrong, contradictory or unsupported claims"
            }
            Dimension::Completeness => {
                "coverage of the essential information the subject calls for; deduct for omissions"
            }
            Dimension::Utility => {
                "practical usefulness to a reader who has to act on this text"
            }
            Dimension::Structure => {
                "organization, sectioning and logical flow of the document"
            }
            Dimension::Language => {
                "clarity, precision and fluency of the prose"
            }
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.schema_key())
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accuracy" => Ok(Dimension::Accuracy),
            "completeness" => Ok(Dimension::Completeness),
            "utility" => Ok(Dimension::Utility),
            "structure" => Ok(Dimension::Structure),
            "language" => Ok(Dimension::Language),
            other => Err(format!("unknown dimension '{other}'")),
        }
    }
}

/// One configured axis: which dimension, and how many points it is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub name: Dimension,
    pub max_score: u32,
}
