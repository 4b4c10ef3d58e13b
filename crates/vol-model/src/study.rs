//! Study (`étude`) resource.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::wire;

/// Backend identifier of a study.
pub type StudyId = i64;

/// A clinical study as served by `/api/etudes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_etude: Option<StudyId>,
    /// Reference code, e.g. `E2024-017`.
    #[serde(default, rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub titre: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, with = "wire::opt_date", skip_serializing_if = "Option::is_none")]
    pub date_debut: Option<NaiveDate>,
    #[serde(default, with = "wire::opt_date", skip_serializing_if = "Option::is_none")]
    pub date_fin: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_sujets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacite_volontaires: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentaires: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Study {
    pub fn window(&self) -> StudyWindow {
        StudyWindow {
            start: self.date_debut,
            end: self.date_fin,
        }
    }

    /// `REF - Titre`, or whichever part exists.
    pub fn display_name(&self) -> String {
        match (self.reference.trim(), self.titre.trim()) {
            ("", "") => "-".to_string(),
            (reference, "") => reference.to_string(),
            ("", titre) => titre.to_string(),
            (reference, titre) => format!("{reference} - {titre}"),
        }
    }
}

/// Date range an appointment of the study may fall into. Either bound may
/// be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudyWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl StudyWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}
