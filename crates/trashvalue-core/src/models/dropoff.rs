use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::waste::WasteItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickupMethod {
    Pickup,
    SelfDropoff,
}

impl PickupMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupMethod::Pickup => "PICKUP",
            PickupMethod::SelfDropoff => "SELF_DROPOFF",
        }
    }
}

impl fmt::Display for PickupMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickupMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PICKUP" => Ok(PickupMethod::Pickup),
            "SELF_DROPOFF" | "DROPOFF" => Ok(PickupMethod::SelfDropoff),
            other => Err(format!("unknown pickup method: {}", other)),
        }
    }
}

/// Status filter for dropoff listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropoffStatus {
    Pending,
    Completed,
}

impl DropoffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropoffStatus::Pending => "PENDING",
            DropoffStatus::Completed => "COMPLETED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dropoff {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub status: String,
    #[serde(rename = "totalWeight", default)]
    pub total_weight: f64,
    #[serde(rename = "totalAmount", default)]
    pub total_amount: f64,
    #[serde(rename = "pickupAddress", default)]
    pub pickup_address: Option<String>,
    #[serde(rename = "pickupDate", default)]
    pub pickup_date: Option<String>,
    #[serde(rename = "pickupMethod", default)]
    pub pickup_method: Option<PickupMethod>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
    #[serde(rename = "wasteItems", default)]
    pub waste_items: Vec<WasteItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDropoffRequest {
    #[serde(rename = "pickupAddress")]
    pub pickup_address: String,
    #[serde(rename = "pickupDate")]
    pub pickup_date: String,
    #[serde(rename = "pickupMethod")]
    pub pickup_method: PickupMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateDropoffRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pickup_address.trim().is_empty() {
            return Err(ValidationError::MissingField("Pickup address"));
        }
        if self.pickup_date.trim().is_empty() {
            return Err(ValidationError::MissingField("Pickup date"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_method_from_str() {
        assert_eq!("PICKUP".parse::<PickupMethod>(), Ok(PickupMethod::Pickup));
        assert_eq!("pickup".parse::<PickupMethod>(), Ok(PickupMethod::Pickup));
        assert_eq!("self-dropoff".parse::<PickupMethod>(), Ok(PickupMethod::SelfDropoff));
        assert_eq!("SELF_DROPOFF".parse::<PickupMethod>(), Ok(PickupMethod::SelfDropoff));
        assert!("courier".parse::<PickupMethod>().is_err());
    }

    #[test]
    fn test_create_request_serialize() {
        let request = CreateDropoffRequest {
            pickup_address: "Jl. Merdeka 1".to_string(),
            pickup_date: "2026-10-20T09:00:00.000Z".to_string(),
            pickup_method: PickupMethod::SelfDropoff,
            notes: None,
        };
        assert!(request.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "pickupAddress": "Jl. Merdeka 1",
                "pickupDate": "2026-10-20T09:00:00.000Z",
                "pickupMethod": "SELF_DROPOFF"
            })
        );
    }

    #[test]
    fn test_create_request_requires_address() {
        let request = CreateDropoffRequest {
            pickup_address: "".to_string(),
            pickup_date: "2026-10-20".to_string(),
            pickup_method: PickupMethod::Pickup,
            notes: Some("Gate code 1234".to_string()),
        };
        assert_eq!(request.validate(), Err(ValidationError::MissingField("Pickup address")));
    }

    #[test]
    fn test_parse_dropoff() {
        let json = r#"{"id":"d-1","userId":"u-1","status":"PENDING","totalWeight":3.5,"totalAmount":28000,"pickupAddress":"Jl. Merdeka 1","pickupDate":"2026-10-20T09:00:00.000Z","pickupMethod":"PICKUP","createdAt":"x","updatedAt":"y","wasteItems":[]}"#;
        let dropoff: Dropoff = serde_json::from_str(json).unwrap();
        assert_eq!(dropoff.pickup_method, Some(PickupMethod::Pickup));
        assert_eq!(dropoff.total_weight, 3.5);
        assert!(dropoff.waste_items.is_empty());
    }
}
