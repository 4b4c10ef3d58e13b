//! Volunteer (`volontaire`) resource.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::phototype::Phototype;
use crate::wire;

/// Backend identifier of a volunteer.
pub type VolunteerId = i64;

/// A study volunteer as served by `/api/volontaires`.
///
/// Fields the client does not model are kept in `extra` and sent back
/// untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_vol: Option<VolunteerId>,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexe: Option<String>,
    #[serde(default, with = "wire::opt_date", skip_serializing_if = "Option::is_none")]
    pub date_naissance: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel_portable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel_domicile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adresse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_postal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ville: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phototype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_peau_visage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethnie: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub archive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentaires: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Volunteer {
    /// `NOM Prénom`, the way volunteers are listed.
    pub fn display_name(&self) -> String {
        let nom = self.nom.trim().to_uppercase();
        let prenom = self.prenom.trim();
        match (nom.is_empty(), prenom.is_empty()) {
            (true, true) => "-".to_string(),
            (true, false) => prenom.to_string(),
            (false, true) => nom,
            (false, false) => format!("{nom} {prenom}"),
        }
    }

    /// Parsed phototype, if the stored value is recognisable.
    pub fn phototype(&self) -> Option<Phototype> {
        self.phototype.as_deref()?.parse().ok()
    }

    pub fn is_archived(&self) -> bool {
        self.archive
    }
}

/// The backend has served `archive` as a boolean, `0/1`, and `"oui"/"non"`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(number)) => number.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(text)) => matches!(
            text.trim().to_lowercase().as_str(),
            "1" | "true" | "oui" | "yes"
        ),
        _ => false,
    })
}
