//! Fitzpatrick skin phototype classification.
//!
//! The backend stores the phototype as free text entered over the years by
//! different forms, so both Roman (`"III"`) and Arabic (`"3"`) spellings occur.
//! [`Phototype::from_str`] accepts either.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Fitzpatrick phototype I to VI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phototype {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl Phototype {
    pub const ALL: [Phototype; 6] = [
        Phototype::I,
        Phototype::II,
        Phototype::III,
        Phototype::IV,
        Phototype::V,
        Phototype::VI,
    ];

    /// Roman numeral as stored by the backend.
    pub fn as_roman(&self) -> &'static str {
        match self {
            Phototype::I => "I",
            Phototype::II => "II",
            Phototype::III => "III",
            Phototype::IV => "IV",
            Phototype::V => "V",
            Phototype::VI => "VI",
        }
    }

    pub fn as_number(&self) -> u8 {
        match self {
            Phototype::I => 1,
            Phototype::II => 2,
            Phototype::III => 3,
            Phototype::IV => 4,
            Phototype::V => 5,
            Phototype::VI => 6,
        }
    }

    /// Short skin description used in listings.
    pub fn description(&self) -> &'static str {
        match self {
            Phototype::I => "Peau très claire",
            Phototype::II => "Peau claire",
            Phototype::III => "Peau claire à mate",
            Phototype::IV => "Peau mate",
            Phototype::V => "Peau foncée",
            Phototype::VI => "Peau noire",
        }
    }

    /// Full display label, e.g. `Phototype III - Peau claire à mate`.
    pub fn label(&self) -> String {
        format!("Phototype {} - {}", self.as_roman(), self.description())
    }
}

impl FromStr for Phototype {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        let bare = normalized
            .strip_prefix("PHOTOTYPE")
            .or_else(|| normalized.strip_prefix("TYPE"))
            .unwrap_or(&normalized)
            .trim();
        let parsed = match bare {
            "I" | "1" => Phototype::I,
            "II" | "2" => Phototype::II,
            "III" | "3" => Phototype::III,
            "IV" | "4" => Phototype::IV,
            "V" | "5" => Phototype::V,
            "VI" | "6" => Phototype::VI,
            _ => return Err(ModelError::InvalidPhototype(s.to_string())),
        };
        Ok(parsed)
    }
}

impl fmt::Display for Phototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_roman())
    }
}
