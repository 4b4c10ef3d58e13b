use reqwest::Method;

use vol_model::{Study, StudyId};

use crate::client::ApiClient;
use crate::error::Result;

const STUDIES: &str = "/api/etudes";

impl ApiClient {
    pub async fn list_studies(&self) -> Result<Vec<Study>> {
        let studies: Vec<Study> = self.get_json(STUDIES).await?;
        tracing::debug!(count = studies.len(), "fetched studies");
        Ok(studies)
    }

    pub async fn get_study(&self, id: StudyId) -> Result<Study> {
        self.get_json(&format!("{STUDIES}/{id}")).await
    }

    pub async fn update_study(&self, id: StudyId, study: &Study) -> Result<Study> {
        self.send_json(Method::PUT, &format!("{STUDIES}/{id}"), study)
            .await
    }

    pub async fn delete_study(&self, id: StudyId) -> Result<()> {
        self.send_no_content::<()>(Method::DELETE, &format!("{STUDIES}/{id}"), None)
            .await
    }
}
