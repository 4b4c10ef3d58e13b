//! Aggregated views and edit deltas.
//!
//! Detail views are assembled from several resources fetched in parallel.
//! Edits are expressed as deltas applied on top of the fetched resource, so
//! unchanged fields (including ones the client does not model) go back to
//! the backend as they came.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use thiserror::Error;

use vol_model::{
    Appointment, CosmeticHabits, Phototype, RdvStatus, Study, Volunteer, VolunteerId, habit_label,
};

/// An edit that would leave a resource in a state the backend rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{0} cannot be empty")]
    Required(&'static str),
    #[error("study ends ({end}) before it starts ({start})")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
    #[error("unknown habit field `{0}`")]
    UnknownHabit(String),
}

/// Cosmetic-habits record of a volunteer. A missing record is an expected
/// state, distinct from a failed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum HabitsState {
    Present(CosmeticHabits),
    Missing,
}

impl From<Option<CosmeticHabits>> for HabitsState {
    fn from(value: Option<CosmeticHabits>) -> Self {
        match value {
            Some(habits) => HabitsState::Present(habits),
            None => HabitsState::Missing,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VolunteerDetail {
    pub volunteer: Volunteer,
    pub habits: HabitsState,
    pub appointments: Vec<Appointment>,
}

impl VolunteerDetail {
    pub fn new(
        volunteer: Volunteer,
        habits: Option<CosmeticHabits>,
        mut appointments: Vec<Appointment>,
    ) -> Self {
        sort_chronologically(&mut appointments);
        Self {
            volunteer,
            habits: habits.into(),
            appointments,
        }
    }

    /// Next appointment on or after `today` that is not cancelled.
    pub fn next_appointment(&self, today: NaiveDate) -> Option<&Appointment> {
        self.appointments.iter().find(|rdv| {
            rdv.etat != RdvStatus::Cancelled && rdv.date.is_some_and(|date| date >= today)
        })
    }
}

#[derive(Debug, Clone)]
pub struct StudyDetail {
    pub study: Study,
    pub appointments: Vec<Appointment>,
    pub volunteers_by_id: BTreeMap<VolunteerId, Volunteer>,
}

impl StudyDetail {
    /// Keeps only the volunteers referenced by the study's appointments.
    pub fn new(study: Study, mut appointments: Vec<Appointment>, volunteers: Vec<Volunteer>) -> Self {
        sort_chronologically(&mut appointments);
        let referenced: std::collections::BTreeSet<VolunteerId> = appointments
            .iter()
            .filter_map(|rdv| rdv.id_volontaire)
            .collect();
        let volunteers_by_id = volunteers
            .into_iter()
            .filter_map(|volunteer| volunteer.id_vol.map(|id| (id, volunteer)))
            .filter(|(id, _)| referenced.contains(id))
            .collect();
        Self {
            study,
            appointments,
            volunteers_by_id,
        }
    }

    /// Appointment counts per status code, in a stable order.
    pub fn status_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for rdv in &self.appointments {
            *counts.entry(rdv.etat.code().to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn placeholder_count(&self) -> usize {
        self.appointments
            .iter()
            .filter(|rdv| rdv.is_placeholder())
            .count()
    }

    pub fn volunteer_name(&self, id: Option<VolunteerId>) -> Option<String> {
        id.and_then(|id| self.volunteers_by_id.get(&id))
            .map(Volunteer::display_name)
    }
}

/// Change to the volunteer link of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolunteerChange {
    Assign(VolunteerId),
    Unassign,
}

/// Editable subset of an appointment. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentEdit {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub volunteer: Option<VolunteerChange>,
    pub comment: Option<String>,
}

impl AppointmentEdit {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time.is_none()
            && self.volunteer.is_none()
            && self.comment.is_none()
    }

    /// Returns `current` with the delta applied. An empty comment clears it.
    pub fn apply(&self, current: &Appointment) -> Appointment {
        let mut updated = current.clone();
        if let Some(date) = self.date {
            updated.date = Some(date);
        }
        if let Some(time) = self.time {
            updated.heure = Some(time);
        }
        match self.volunteer {
            Some(VolunteerChange::Assign(id)) => updated.id_volontaire = Some(id),
            Some(VolunteerChange::Unassign) => updated.id_volontaire = None,
            None => {}
        }
        if let Some(comment) = &self.comment {
            let trimmed = comment.trim();
            updated.commentaires = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        updated
    }
}

/// Editable subset of a volunteer. `None` leaves a field as is; an empty
/// string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolunteerEdit {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub sexe: Option<String>,
    pub date_naissance: Option<NaiveDate>,
    pub email: Option<String>,
    pub tel_portable: Option<String>,
    pub tel_domicile: Option<String>,
    pub adresse: Option<String>,
    pub code_postal: Option<String>,
    pub ville: Option<String>,
    pub phototype: Option<Phototype>,
    pub commentaires: Option<String>,
}

impl VolunteerEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, current: &Volunteer) -> Result<Volunteer, EditError> {
        let mut updated = current.clone();
        set_required(&mut updated.nom, self.nom.as_deref(), "nom")?;
        set_required(&mut updated.prenom, self.prenom.as_deref(), "prenom")?;
        set_optional(&mut updated.sexe, self.sexe.as_deref());
        if let Some(date) = self.date_naissance {
            updated.date_naissance = Some(date);
        }
        set_optional(&mut updated.email, self.email.as_deref());
        set_optional(&mut updated.tel_portable, self.tel_portable.as_deref());
        set_optional(&mut updated.tel_domicile, self.tel_domicile.as_deref());
        set_optional(&mut updated.adresse, self.adresse.as_deref());
        set_optional(&mut updated.code_postal, self.code_postal.as_deref());
        set_optional(&mut updated.ville, self.ville.as_deref());
        if let Some(phototype) = self.phototype {
            updated.phototype = Some(phototype.as_roman().to_string());
        }
        set_optional(&mut updated.commentaires, self.commentaires.as_deref());
        Ok(updated)
    }
}

/// Editable subset of a study, with the same conventions as
/// [`VolunteerEdit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyEdit {
    pub reference: Option<String>,
    pub titre: Option<String>,
    pub kind: Option<String>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub nb_sujets: Option<u32>,
    pub commentaires: Option<String>,
}

impl StudyEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fails when the resulting start date falls after the end date.
    pub fn apply(&self, current: &Study) -> Result<Study, EditError> {
        let mut updated = current.clone();
        set_required(&mut updated.reference, self.reference.as_deref(), "ref")?;
        set_required(&mut updated.titre, self.titre.as_deref(), "titre")?;
        set_optional(&mut updated.kind, self.kind.as_deref());
        if let Some(date) = self.date_debut {
            updated.date_debut = Some(date);
        }
        if let Some(date) = self.date_fin {
            updated.date_fin = Some(date);
        }
        if let Some(count) = self.nb_sujets {
            updated.nb_sujets = Some(count);
        }
        set_optional(&mut updated.commentaires, self.commentaires.as_deref());
        if let (Some(start), Some(end)) = (updated.date_debut, updated.date_fin)
            && end < start
        {
            return Err(EditError::InvertedWindow { start, end });
        }
        Ok(updated)
    }
}

/// Answers to set or clear in a cosmetic-habits questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitsEdit {
    pub set: Vec<(String, String)>,
    pub unset: Vec<String>,
}

impl HabitsEdit {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    /// Applies the answers on top of `current`, or on a fresh record for
    /// `volunteer_id` when there is none yet. Only catalog fields may be
    /// edited; cleared answers are sent as `null`.
    pub fn apply(
        &self,
        volunteer_id: VolunteerId,
        current: Option<&CosmeticHabits>,
    ) -> Result<CosmeticHabits, EditError> {
        let mut updated = current.cloned().unwrap_or_else(|| CosmeticHabits {
            id_vol: volunteer_id,
            ..CosmeticHabits::default()
        });
        for key in self.set.iter().map(|(key, _)| key).chain(&self.unset) {
            if habit_label(key).is_none() {
                return Err(EditError::UnknownHabit(key.clone()));
            }
        }
        for (key, value) in &self.set {
            let value = value.trim();
            let value = if value.is_empty() {
                Value::Null
            } else {
                Value::String(value.to_string())
            };
            updated.fields.insert(key.clone(), value);
        }
        for key in &self.unset {
            updated.fields.insert(key.clone(), Value::Null);
        }
        Ok(updated)
    }
}

fn set_required(
    target: &mut String,
    value: Option<&str>,
    field: &'static str,
) -> Result<(), EditError> {
    if let Some(value) = value {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EditError::Required(field));
        }
        *target = trimmed.to_string();
    }
    Ok(())
}

fn set_optional(target: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value {
        let trimmed = value.trim();
        *target = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
}

fn sort_chronologically(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| (a.date, a.heure, a.id_rdv).cmp(&(b.date, b.heure, b.id_rdv)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rdv(id: i64, volunteer: Option<i64>, day: u32, etat: RdvStatus) -> Appointment {
        Appointment {
            id_etude: 1,
            id_rdv: id,
            id_volontaire: volunteer,
            date: NaiveDate::from_ymd_opt(2024, 5, day),
            heure: NaiveTime::from_hms_opt(9, 0, 0),
            etat,
            ..Appointment::default()
        }
    }

    #[test]
    fn edit_keeps_untouched_fields() {
        let mut current = rdv(3, Some(8), 2, RdvStatus::Confirmed);
        current.commentaires = Some("à jeun".to_string());
        current
            .extra
            .insert("salle".to_string(), serde_json::json!("B2"));

        let edit = AppointmentEdit {
            time: NaiveTime::from_hms_opt(10, 30, 0),
            volunteer: Some(VolunteerChange::Unassign),
            ..AppointmentEdit::default()
        };
        let updated = edit.apply(&current);
        assert_eq!(updated.heure, NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(updated.id_volontaire, None);
        assert_eq!(updated.date, current.date);
        assert_eq!(updated.commentaires.as_deref(), Some("à jeun"));
        assert_eq!(updated.extra["salle"], "B2");

        let cleared = AppointmentEdit {
            comment: Some(" ".to_string()),
            ..AppointmentEdit::default()
        }
        .apply(&current);
        assert_eq!(cleared.commentaires, None);
    }

    #[test]
    fn study_detail_counts_and_filters_volunteers() {
        let appointments = vec![
            rdv(2, Some(10), 3, RdvStatus::Planned),
            rdv(1, None, 2, RdvStatus::Planned),
            rdv(3, Some(11), 4, RdvStatus::Cancelled),
        ];
        let volunteers = vec![
            Volunteer {
                id_vol: Some(10),
                nom: "Roux".to_string(),
                prenom: "Ana".to_string(),
                ..Volunteer::default()
            },
            Volunteer {
                id_vol: Some(99),
                ..Volunteer::default()
            },
        ];
        let detail = StudyDetail::new(Study::default(), appointments, volunteers);
        assert_eq!(detail.appointments[0].id_rdv, 1);
        assert_eq!(detail.status_counts()["PLANIFIE"], 2);
        assert_eq!(detail.placeholder_count(), 1);
        assert_eq!(detail.volunteers_by_id.len(), 1);
        assert_eq!(detail.volunteer_name(Some(10)).as_deref(), Some("ROUX Ana"));
        assert_eq!(detail.volunteer_name(Some(11)), None);
    }

    #[test]
    fn next_appointment_skips_cancelled_and_past() {
        let detail = VolunteerDetail::new(
            Volunteer::default(),
            None,
            vec![
                rdv(1, Some(1), 1, RdvStatus::Completed),
                rdv(2, Some(1), 5, RdvStatus::Cancelled),
                rdv(3, Some(1), 9, RdvStatus::Planned),
            ],
        );
        let today = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        assert_eq!(detail.next_appointment(today).map(|r| r.id_rdv), Some(3));
        assert_eq!(detail.habits, HabitsState::Missing);
    }

    #[test]
    fn volunteer_edit_trims_and_clears() {
        let current = Volunteer {
            id_vol: Some(4),
            nom: "Martin".to_string(),
            prenom: "Claire".to_string(),
            email: Some("c.martin@example.org".to_string()),
            ville: Some("Lyon".to_string()),
            extra: BTreeMap::from([("santeCompatible".to_string(), serde_json::json!("oui"))]),
            ..Volunteer::default()
        };
        let edit = VolunteerEdit {
            prenom: Some(" Claire-Anne ".to_string()),
            email: Some(String::new()),
            phototype: Some(Phototype::IV),
            ..VolunteerEdit::default()
        };
        let updated = edit.apply(&current).unwrap();
        assert_eq!(updated.prenom, "Claire-Anne");
        assert_eq!(updated.email, None);
        assert_eq!(updated.phototype.as_deref(), Some("IV"));
        assert_eq!(updated.nom, "Martin");
        assert_eq!(updated.ville.as_deref(), Some("Lyon"));
        assert_eq!(updated.extra, current.extra);
    }

    #[test]
    fn volunteer_edit_refuses_a_blank_name() {
        let edit = VolunteerEdit {
            nom: Some("  ".to_string()),
            ..VolunteerEdit::default()
        };
        assert!(!edit.is_empty());
        assert_eq!(
            edit.apply(&Volunteer::default()),
            Err(EditError::Required("nom"))
        );
        assert!(VolunteerEdit::default().is_empty());
    }

    #[test]
    fn study_edit_checks_the_resulting_window() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let current = Study {
            id_etude: Some(2),
            reference: "E2024-017".to_string(),
            titre: "Hydratation".to_string(),
            date_debut: Some(day(1)),
            date_fin: Some(day(31)),
            ..Study::default()
        };
        let moved = StudyEdit {
            date_fin: Some(day(20)),
            nb_sujets: Some(30),
            ..StudyEdit::default()
        }
        .apply(&current)
        .unwrap();
        assert_eq!(moved.date_fin, Some(day(20)));
        assert_eq!(moved.nb_sujets, Some(30));
        assert_eq!(moved.reference, "E2024-017");

        let inverted = StudyEdit {
            date_debut: Some(day(31)),
            date_fin: Some(day(2)),
            ..StudyEdit::default()
        }
        .apply(&current);
        assert_eq!(
            inverted,
            Err(EditError::InvertedWindow {
                start: day(31),
                end: day(2)
            })
        );
    }

    #[test]
    fn habits_edit_starts_a_missing_questionnaire() {
        let edit = HabitsEdit {
            set: vec![("mascara".to_string(), "oui".to_string())],
            unset: Vec::new(),
        };
        let created = edit.apply(12, None).unwrap();
        assert_eq!(created.id_vol, 12);
        assert_eq!(created.fields["mascara"], "oui");
        assert_eq!(created.fields.len(), 1);
    }

    #[test]
    fn habits_edit_updates_and_clears_existing_answers() {
        let current = CosmeticHabits {
            id_vol: 5,
            fields: BTreeMap::from([
                ("idHc".to_string(), serde_json::json!(99)),
                ("cremeJour".to_string(), serde_json::json!("non")),
                ("serum".to_string(), serde_json::json!("oui")),
            ]),
        };
        let edit = HabitsEdit {
            set: vec![("cremeJour".to_string(), " oui ".to_string())],
            unset: vec!["serum".to_string()],
        };
        let updated = edit.apply(5, Some(&current)).unwrap();
        assert_eq!(updated.fields["cremeJour"], "oui");
        assert_eq!(updated.fields["serum"], Value::Null);
        assert_eq!(updated.fields["idHc"], 99);
    }

    #[test]
    fn habits_edit_rejects_fields_outside_the_catalog() {
        let edit = HabitsEdit {
            set: Vec::new(),
            unset: vec!["marqueFavorite".to_string()],
        };
        assert_eq!(
            edit.apply(5, None),
            Err(EditError::UnknownHabit("marqueFavorite".to_string()))
        );
    }
}
