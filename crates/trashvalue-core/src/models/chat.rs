use serde::{Deserialize, Serialize};

use super::upload::FileUpload;

/// Message to the AI assistant, optionally with a photo of the waste.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub image: Option<FileUpload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub message: String,
    /// The assistant's reply.
    pub response: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub user: Option<ChatUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: ChatRecord,
}
