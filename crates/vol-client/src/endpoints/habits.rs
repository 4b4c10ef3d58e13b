use reqwest::Method;

use vol_model::{CosmeticHabits, VolunteerId};

use crate::client::ApiClient;
use crate::error::{ApiError, Result};

const HABITS: &str = "/api/volontaires-hc";

impl ApiClient {
    /// Cosmetic habits of a volunteer. `Ok(None)` when the volunteer has no
    /// questionnaire yet.
    pub async fn get_habits(&self, volunteer_id: VolunteerId) -> Result<Option<CosmeticHabits>> {
        match self.get_json(&format!("{HABITS}/{volunteer_id}")).await {
            Ok(habits) => Ok(Some(habits)),
            Err(ApiError::NotFound(_)) => {
                tracing::debug!(volunteer_id, "no cosmetic habits recorded");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create_habits(&self, habits: &CosmeticHabits) -> Result<CosmeticHabits> {
        self.send_json(Method::POST, HABITS, habits).await
    }

    pub async fn update_habits(&self, habits: &CosmeticHabits) -> Result<CosmeticHabits> {
        self.send_json(Method::PUT, &format!("{HABITS}/{}", habits.id_vol), habits)
            .await
    }
}
