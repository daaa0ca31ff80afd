use serde::{Deserialize, Serialize};

use super::dropoff::PickupMethod;
use super::error::ValidationError;
use super::upload::FileUpload;

/// Fee charged per kilogram when the waste is picked up rather than dropped off.
pub const PICKUP_FEE_PER_KG: f64 = 5000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteType {
    pub id: String,
    pub name: String,
    #[serde(rename = "pricePerKg")]
    pub price_per_kg: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteItem {
    pub id: String,
    #[serde(rename = "dropoffId")]
    pub dropoff_id: String,
    #[serde(rename = "wasteTypeId")]
    pub waste_type_id: String,
    pub weight: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
    #[serde(rename = "wasteType", default)]
    pub waste_type: Option<WasteType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WasteBankCount {
    #[serde(default)]
    pub dropoffs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteBank {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "_count", default)]
    pub count: WasteBankCount,
}

impl WasteBank {
    pub fn dropoff_count(&self) -> u64 {
        self.count.dropoffs
    }
}

/// Waste item added to an existing dropoff. Sent as a multipart form.
#[derive(Debug, Clone)]
pub struct CreateWasteItemRequest {
    pub waste_type_id: String,
    pub weight: f64,
    pub notes: Option<String>,
    pub image: Option<FileUpload>,
}

impl CreateWasteItemRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.waste_type_id.trim().is_empty() {
            return Err(ValidationError::MissingField("Waste type"));
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(ValidationError::InvalidWeight);
        }
        Ok(())
    }
}

/// Estimated payout for `weight_kg` of waste at `price_per_kg`.
///
/// Pickup costs [`PICKUP_FEE_PER_KG`] per kilogram, self drop-off is free.
/// The result is negative when the fee exceeds the value of the waste.
/// A negative or non-finite weight estimates to zero.
pub fn estimate_reward(price_per_kg: f64, weight_kg: f64, method: PickupMethod) -> f64 {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return 0.0;
    }
    let base = price_per_kg * weight_kg;
    let fee = match method {
        PickupMethod::Pickup => PICKUP_FEE_PER_KG * weight_kg,
        PickupMethod::SelfDropoff => 0.0,
    };
    base - fee
}
