use reqwest::Method;

use vol_core::AppointmentSink;
use vol_model::{
    Appointment, AppointmentDraft, AppointmentKey, RdvStatus, StatusUpdate, StudyId, VolunteerId,
};

use crate::client::ApiClient;
use crate::error::{ApiError, Result};

const APPOINTMENTS: &str = "/api/rdvs";

fn appointment_path(key: AppointmentKey) -> String {
    format!(
        "{APPOINTMENTS}/{}/{}",
        key.study_id, key.appointment_id
    )
}

impl ApiClient {
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        let appointments: Vec<Appointment> = self.get_json(APPOINTMENTS).await?;
        tracing::debug!(count = appointments.len(), "fetched appointments");
        Ok(appointments)
    }

    pub async fn list_study_appointments(&self, study_id: StudyId) -> Result<Vec<Appointment>> {
        self.get_json(&format!("{APPOINTMENTS}/etude/{study_id}"))
            .await
    }

    pub async fn list_volunteer_appointments(
        &self,
        volunteer_id: VolunteerId,
    ) -> Result<Vec<Appointment>> {
        self.get_json(&format!("{APPOINTMENTS}/volontaire/{volunteer_id}"))
            .await
    }

    pub async fn get_appointment(&self, key: AppointmentKey) -> Result<Appointment> {
        self.get_json(&appointment_path(key)).await
    }

    pub async fn create_appointment(&self, draft: &AppointmentDraft) -> Result<Appointment> {
        self.send_json(Method::POST, APPOINTMENTS, draft).await
    }

    pub async fn update_appointment(&self, appointment: &Appointment) -> Result<Appointment> {
        self.send_json(Method::PUT, &appointment_path(appointment.key()), appointment)
            .await
    }

    pub async fn delete_appointment(&self, key: AppointmentKey) -> Result<()> {
        self.send_no_content::<()>(Method::DELETE, &appointment_path(key), None)
            .await
    }

    /// Direct status change. Transitions are not checked client-side; the
    /// backend decides whether they are allowed.
    pub async fn set_appointment_status(&self, key: AppointmentKey, status: RdvStatus) -> Result<()> {
        let path = format!("{}/status", appointment_path(key));
        tracing::info!(appointment = %key, status = %status, "updating appointment status");
        self.send_no_content(Method::PUT, &path, Some(&StatusUpdate { etat: status }))
            .await
    }
}

impl AppointmentSink for ApiClient {
    type Error = ApiError;

    async fn create_appointment(&self, draft: &AppointmentDraft) -> Result<Appointment> {
        ApiClient::create_appointment(self, draft).await
    }
}
