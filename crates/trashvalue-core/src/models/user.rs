use serde::{Deserialize, Serialize};

use super::upload::FileUpload;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "profileImage", default)]
    pub profile_image: Option<String>,
    #[serde(rename = "backgroundPhoto", default)]
    pub background_photo: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

/// Profile update. Sent as JSON unless a photo is attached, in which case
/// the whole update goes out as a multipart form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip)]
    pub profile_image: Option<FileUpload>,
    #[serde(skip)]
    pub background_photo: Option<FileUpload>,
}

impl UpdateUserRequest {
    pub fn has_files(&self) -> bool {
        self.profile_image.is_some() || self.background_photo.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.address.is_none() && !self.has_files()
    }
}
