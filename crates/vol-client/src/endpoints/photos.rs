use reqwest::Method;
use reqwest::multipart::{Form, Part};

use vol_model::{Photo, PhotoId, VolunteerId};

use crate::client::{ApiClient, read_json};
use crate::error::{ApiError, Result};

const PHOTOS: &str = "/api/photos";

/// A photo to upload for a volunteer.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub volunteer_id: VolunteerId,
    pub file_name: String,
    pub content: Vec<u8>,
    /// Free category such as `face` or `profil`.
    pub kind: Option<String>,
}

impl PhotoUpload {
    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "heic" => "image/heic",
            _ => "application/octet-stream",
        }
    }
}

impl ApiClient {
    pub async fn list_photos(&self, volunteer_id: VolunteerId) -> Result<Vec<Photo>> {
        self.get_json(&format!("{PHOTOS}/volontaire/{volunteer_id}"))
            .await
    }

    /// Multipart upload with fields `file`, `idVol` and optional `typePhoto`.
    pub async fn upload_photo(&self, upload: PhotoUpload) -> Result<Photo> {
        let mime = upload.mime_type();
        let size = upload.content.len();
        let part = Part::bytes(upload.content)
            .file_name(upload.file_name.clone())
            .mime_str(mime)
            .map_err(|e| ApiError::Config(format!("invalid MIME type {mime}: {e}")))?;
        let mut form = Form::new()
            .part("file", part)
            .text("idVol", upload.volunteer_id.to_string());
        if let Some(kind) = upload.kind {
            form = form.text("typePhoto", kind);
        }
        tracing::info!(
            volunteer_id = upload.volunteer_id,
            bytes = size,
            "uploading photo"
        );
        let path = format!("{PHOTOS}/upload");
        let response = self
            .request(Method::POST, &path)
            .multipart(form)
            .send()
            .await?;
        read_json(response, &path).await
    }

    /// Raw photo content.
    pub async fn download_photo(&self, id: PhotoId) -> Result<Vec<u8>> {
        self.get_bytes(&format!("{PHOTOS}/{id}/download")).await
    }

    pub async fn delete_photo(&self, id: PhotoId) -> Result<()> {
        self.send_no_content::<()>(Method::DELETE, &format!("{PHOTOS}/{id}"), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        let mut upload = PhotoUpload {
            volunteer_id: 1,
            file_name: "visage.JPG".to_string(),
            content: Vec::new(),
            kind: None,
        };
        assert_eq!(upload.mime_type(), "image/jpeg");
        upload.file_name = "scan".to_string();
        assert_eq!(upload.mime_type(), "application/octet-stream");
    }
}
