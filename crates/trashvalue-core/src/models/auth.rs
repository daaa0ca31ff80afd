use serde::{Deserialize, Serialize};

use super::upload::FileUpload;
use crate::auth::UserSummary;

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Account fields returned with a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl LoginUser {
    pub fn to_summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: LoginUser,
    pub token: Option<String>,
}

/// New account registration. Sent as a multipart form.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub profile_image: Option<FileUpload>,
    pub background_photo: Option<FileUpload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}
