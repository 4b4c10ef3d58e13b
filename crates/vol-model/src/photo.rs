//! Volunteer photo metadata (`/api/photos`).

use serde::{Deserialize, Serialize};

use crate::volunteer::VolunteerId;

pub type PhotoId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id_photo: PhotoId,
    pub id_vol: VolunteerId,
    #[serde(default)]
    pub nom_fichier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_creation: Option<String>,
}
