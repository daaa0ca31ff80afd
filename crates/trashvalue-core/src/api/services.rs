//! Resource endpoints: profile, catalog, dropoffs, transactions and chat.

use tracing::debug;

use super::client::ApiClient;
use super::transport::{HttpRequest, MultipartForm};
use super::ApiResult;
use crate::models::{
    ChatRequest, ChatResponse, CreateDropoffRequest, CreateWasteItemRequest, Dropoff,
    DropoffStatus, Envelope, Paginated, SortDirection, TopUpRequest, TopUpResponse, Transaction,
    UpdateUserRequest, User, WasteBank, WasteItem, WasteType, WithdrawalRequest,
};

/// Default page sizes used by the list screens.
pub const WASTE_TYPES_PAGE_SIZE: u32 = 6;
pub const WASTE_BANKS_PAGE_SIZE: u32 = 5;
pub const DROPOFFS_PAGE_SIZE: u32 = 10;
pub const TRANSACTIONS_PAGE_SIZE: u32 = 10;

impl ApiClient {
    // ===== User profile =====

    pub async fn get_user(&self, user_id: &str) -> ApiResult<User> {
        let response: Envelope<User> = self
            .fetch(HttpRequest::get(format!("/users/{}", user_id)))
            .await?;
        Ok(response.data)
    }

    /// Profile of the signed-in user.
    pub async fn current_user(&self) -> ApiResult<User> {
        let user_id = self.current_user_id().await?;
        self.get_user(&user_id).await
    }

    /// Update profile fields. Goes out as multipart when a photo is attached.
    pub async fn update_user(&self, user_id: &str, update: &UpdateUserRequest) -> ApiResult<User> {
        let path = format!("/users/{}", user_id);
        let request = if update.has_files() {
            let mut form = MultipartForm::new();
            if let Some(ref name) = update.name {
                form = form.text("name", name);
            }
            if let Some(ref phone) = update.phone {
                form = form.text("phone", phone);
            }
            if let Some(ref address) = update.address {
                form = form.text("address", address);
            }
            if let Some(ref image) = update.profile_image {
                form = form.file("profileImage", image.clone());
            }
            if let Some(ref photo) = update.background_photo {
                form = form.file("backgroundPhoto", photo.clone());
            }
            HttpRequest::patch(path).multipart(form)
        } else {
            HttpRequest::patch(path).json(update)?
        };

        let response: Envelope<User> = self.fetch(request).await?;
        Ok(response.data)
    }

    pub async fn update_password(&self, user_id: &str, password: &str) -> ApiResult<User> {
        let request = HttpRequest::patch(format!("/users/{}", user_id))
            .json(&serde_json::json!({ "password": password }))?;
        let response: Envelope<User> = self.fetch(request).await?;
        Ok(response.data)
    }

    // ===== Catalog =====

    pub async fn waste_types(&self, page: u32, limit: u32) -> ApiResult<Paginated<WasteType>> {
        self.fetch(
            HttpRequest::get("/waste-types")
                .query("page", page)
                .query("limit", limit),
        )
        .await
    }

    pub async fn waste_banks(&self, page: u32, limit: u32) -> ApiResult<Paginated<WasteBank>> {
        self.fetch(
            HttpRequest::get("/waste-banks")
                .query("page", page)
                .query("limit", limit),
        )
        .await
    }

    // ===== Dropoffs =====

    pub async fn dropoffs(
        &self,
        page: u32,
        limit: u32,
        status: DropoffStatus,
    ) -> ApiResult<Paginated<Dropoff>> {
        self.fetch(
            HttpRequest::get("/dropoffs")
                .query("page", page)
                .query("limit", limit)
                .query("status", status.as_str()),
        )
        .await
    }

    pub async fn completed_dropoffs(&self, page: u32, limit: u32) -> ApiResult<Paginated<Dropoff>> {
        self.dropoffs(page, limit, DropoffStatus::Completed).await
    }

    pub async fn create_dropoff(&self, request: &CreateDropoffRequest) -> ApiResult<Dropoff> {
        request.validate()?;
        let response: Envelope<Dropoff> = self
            .fetch(HttpRequest::post("/dropoffs").json(request)?)
            .await?;
        debug!(dropoff_id = %response.data.id, "Dropoff created");
        Ok(response.data)
    }

    pub async fn add_waste_item(
        &self,
        dropoff_id: &str,
        request: &CreateWasteItemRequest,
    ) -> ApiResult<WasteItem> {
        request.validate()?;

        let mut form = MultipartForm::new()
            .text("wasteTypeId", &request.waste_type_id)
            .text("weight", request.weight.to_string());
        if let Some(notes) = request.notes.as_deref().filter(|n| !n.is_empty()) {
            form = form.text("notes", notes);
        }
        if let Some(ref image) = request.image {
            form = form.file("image", image.clone());
        }

        let response: Envelope<WasteItem> = self
            .fetch(
                HttpRequest::post(format!("/waste/dropoffs/{}/items", dropoff_id)).multipart(form),
            )
            .await?;
        Ok(response.data)
    }

    // ===== Transactions =====

    pub async fn user_transactions(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
        sort: SortDirection,
    ) -> ApiResult<Paginated<Transaction>> {
        self.fetch(
            HttpRequest::get(format!("/transactions/users/{}", user_id))
                .query("page", page)
                .query("limit", limit)
                .query("sort", sort.as_str()),
        )
        .await
    }

    /// Start a top up. The response carries the payment page URL.
    pub async fn top_up(&self, request: &TopUpRequest) -> ApiResult<TopUpResponse> {
        self.fetch(HttpRequest::post("/transactions/topup").json(request)?)
            .await
    }

    pub async fn withdraw(&self, request: &WithdrawalRequest) -> ApiResult<Transaction> {
        let response: Envelope<Transaction> = self
            .fetch(HttpRequest::post("/transactions/withdrawal").json(request)?)
            .await?;
        Ok(response.data)
    }

    // ===== AI chat =====

    pub async fn send_chat(&self, request: &ChatRequest) -> ApiResult<ChatResponse> {
        let mut form = MultipartForm::new().text("message", &request.message);
        if let Some(ref image) = request.image {
            form = form.file("image", image.clone());
        }
        self.fetch(HttpRequest::post("/chat").multipart(form)).await
    }
}
