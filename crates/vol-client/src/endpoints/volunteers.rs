use reqwest::Method;

use vol_model::{Volunteer, VolunteerId};

use crate::client::ApiClient;
use crate::error::Result;

const VOLUNTEERS: &str = "/api/volontaires";

impl ApiClient {
    pub async fn list_volunteers(&self) -> Result<Vec<Volunteer>> {
        let volunteers: Vec<Volunteer> = self.get_json(VOLUNTEERS).await?;
        tracing::debug!(count = volunteers.len(), "fetched volunteers");
        Ok(volunteers)
    }

    pub async fn get_volunteer(&self, id: VolunteerId) -> Result<Volunteer> {
        self.get_json(&format!("{VOLUNTEERS}/{id}")).await
    }

    pub async fn update_volunteer(&self, id: VolunteerId, volunteer: &Volunteer) -> Result<Volunteer> {
        self.send_json(Method::PUT, &format!("{VOLUNTEERS}/{id}"), volunteer)
            .await
    }

    pub async fn delete_volunteer(&self, id: VolunteerId) -> Result<()> {
        self.send_no_content::<()>(Method::DELETE, &format!("{VOLUNTEERS}/{id}"), None)
            .await
    }

    /// Sets the archive flag through a fetch-modify-update cycle.
    pub async fn set_volunteer_archived(&self, id: VolunteerId, archived: bool) -> Result<Volunteer> {
        let mut volunteer = self.get_volunteer(id).await?;
        if volunteer.archive == archived {
            return Ok(volunteer);
        }
        volunteer.archive = archived;
        self.update_volunteer(id, &volunteer).await
    }
}
