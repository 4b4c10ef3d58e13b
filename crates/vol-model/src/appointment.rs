//! Appointment (`rendez-vous`) resource and its status codes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::study::StudyId;
use crate::volunteer::VolunteerId;
use crate::wire;

/// Backend identifier of an appointment within its study.
pub type AppointmentId = i64;

/// Appointment status as stored by the backend (`etat`).
///
/// Codes the client does not know are preserved in [`RdvStatus::Other`] so
/// they survive a fetch-edit-submit cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RdvStatus {
    #[default]
    Planned,
    Confirmed,
    Cancelled,
    Completed,
    Other(String),
}

impl RdvStatus {
    pub const KNOWN: [RdvStatus; 4] = [
        RdvStatus::Planned,
        RdvStatus::Confirmed,
        RdvStatus::Cancelled,
        RdvStatus::Completed,
    ];

    /// Backend code (`PLANIFIE`, `CONFIRME`, ...).
    pub fn code(&self) -> &str {
        match self {
            RdvStatus::Planned => "PLANIFIE",
            RdvStatus::Confirmed => "CONFIRME",
            RdvStatus::Cancelled => "ANNULE",
            RdvStatus::Completed => "COMPLETE",
            RdvStatus::Other(code) => code,
        }
    }

    /// French label; unknown codes are returned unchanged.
    pub fn label(&self) -> &str {
        match self {
            RdvStatus::Planned => "Planifié",
            RdvStatus::Confirmed => "Confirmé",
            RdvStatus::Cancelled => "Annulé",
            RdvStatus::Completed => "Complété",
            RdvStatus::Other(code) => code,
        }
    }

    /// Maps a code to a known status, case-insensitively.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "PLANIFIE" => RdvStatus::Planned,
            "CONFIRME" => RdvStatus::Confirmed,
            "ANNULE" => RdvStatus::Cancelled,
            "COMPLETE" => RdvStatus::Completed,
            _ => RdvStatus::Other(code.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RdvStatus::Other(_))
    }
}

impl From<String> for RdvStatus {
    fn from(value: String) -> Self {
        RdvStatus::from_code(&value)
    }
}

impl From<RdvStatus> for String {
    fn from(value: RdvStatus) -> Self {
        value.code().to_string()
    }
}

impl FromStr for RdvStatus {
    type Err = ModelError;

    /// Strict parse for user input: only known codes are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = RdvStatus::from_code(s);
        if status.is_known() {
            Ok(status)
        } else {
            Err(ModelError::InvalidStatus(s.to_string()))
        }
    }
}

impl fmt::Display for RdvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Composite key of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppointmentKey {
    pub study_id: StudyId,
    pub appointment_id: AppointmentId,
}

impl fmt::Display for AppointmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.study_id, self.appointment_id)
    }
}

/// An appointment as served by `/api/rdvs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id_etude: StudyId,
    pub id_rdv: AppointmentId,
    #[serde(default)]
    pub id_volontaire: Option<VolunteerId>,
    #[serde(default, with = "wire::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "wire::opt_time")]
    pub heure: Option<NaiveTime>,
    #[serde(default)]
    pub etat: RdvStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentaires: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Appointment {
    pub fn key(&self) -> AppointmentKey {
        AppointmentKey {
            study_id: self.id_etude,
            appointment_id: self.id_rdv,
        }
    }

    /// Appointments created without a volunteer, waiting for assignment.
    pub fn is_placeholder(&self) -> bool {
        self.id_volontaire.is_none()
    }
}

/// Creation payload for `POST /api/rdvs`. The backend assigns `idRdv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub id_etude: StudyId,
    pub id_volontaire: Option<VolunteerId>,
    #[serde(with = "wire::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(with = "wire::opt_time")]
    pub heure: Option<NaiveTime>,
    pub etat: RdvStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentaires: Option<String>,
}

/// Body of `PUT /api/rdvs/{etude}/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub etat: RdvStatus,
}
