//! Data models for the TrashValue backend.
//!
//! This module contains the request and response types for every
//! endpoint the client talks to:
//!
//! - `auth`: login and registration
//! - `User`: account profile, balance and points
//! - `WasteType`, `WasteItem`, `WasteBank`: recycling catalog and items
//! - `Dropoff`: pickup / drop-off requests
//! - `Transaction`: top ups and withdrawals
//! - `ChatRecord`: AI assistant conversations
//! - `Paginated`, `Pager`: paged list responses and paging state

pub mod auth;
pub mod chat;
pub mod dropoff;
pub mod error;
pub mod pagination;
pub mod transaction;
pub mod upload;
pub mod user;
pub mod waste;

use serde::{Deserialize, Serialize};

pub use auth::{LoginCredentials, LoginResponse, RegisterRequest, RegisterResponse};
pub use chat::{ChatRecord, ChatRequest, ChatResponse, ChatUser};
pub use dropoff::{CreateDropoffRequest, Dropoff, DropoffStatus, PickupMethod};
pub use error::ValidationError;
pub use pagination::{PageMeta, Paginated, Pager};
pub use transaction::{
    parse_amount, validate_transfer_amount, PaymentMethod, SortDirection, TopUpData, TopUpRequest,
    TopUpResponse, Transaction, TransactionStatus, TransactionType, WithdrawalRequest,
    MINIMUM_TRANSFER_AMOUNT,
};
pub use upload::FileUpload;
pub use user::{UpdateUserRequest, User};
pub use waste::{
    estimate_reward, CreateWasteItemRequest, WasteBank, WasteItem, WasteType, PICKUP_FEE_PER_KG,
};

/// Standard single-object response wrapper: `{ status, message, data }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: T,
}
