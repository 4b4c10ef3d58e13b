//! Multi-resource loads for detail views and forms.
//!
//! Independent requests are issued together and awaited jointly; the first
//! failure fails the whole load.

use futures_util::try_join;

use vol_core::{StudyDetail, VolunteerDetail};
use vol_model::{Appointment, AppointmentKey, Study, StudyId, Volunteer, VolunteerId};

use crate::client::ApiClient;
use crate::error::Result;

/// Reference data needed by the bulk appointment form.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub volunteers: Vec<Volunteer>,
    pub studies: Vec<Study>,
}

/// An appointment with the resources its edit form displays.
#[derive(Debug, Clone)]
pub struct AppointmentContext {
    pub appointment: Appointment,
    pub study: Study,
    pub volunteer: Option<Volunteer>,
}

impl ApiClient {
    pub async fn reference_data(&self) -> Result<ReferenceData> {
        let (volunteers, studies) = try_join!(self.list_volunteers(), self.list_studies())?;
        Ok(ReferenceData {
            volunteers,
            studies,
        })
    }

    pub async fn volunteer_detail(&self, id: VolunteerId) -> Result<VolunteerDetail> {
        let (volunteer, habits, appointments) = try_join!(
            self.get_volunteer(id),
            self.get_habits(id),
            self.list_volunteer_appointments(id)
        )?;
        Ok(VolunteerDetail::new(volunteer, habits, appointments))
    }

    pub async fn study_detail(&self, id: StudyId) -> Result<StudyDetail> {
        let (study, appointments, volunteers) = try_join!(
            self.get_study(id),
            self.list_study_appointments(id),
            self.list_volunteers()
        )?;
        Ok(StudyDetail::new(study, appointments, volunteers))
    }

    pub async fn appointment_context(&self, key: AppointmentKey) -> Result<AppointmentContext> {
        let (appointment, study) =
            try_join!(self.get_appointment(key), self.get_study(key.study_id))?;
        let volunteer = match appointment.id_volontaire {
            Some(id) => Some(self.get_volunteer(id).await?),
            None => None,
        };
        Ok(AppointmentContext {
            appointment,
            study,
            volunteer,
        })
    }
}
