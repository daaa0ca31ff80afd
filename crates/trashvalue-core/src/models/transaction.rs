use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::utils::format_rupiah;

/// Smallest top up or withdrawal the platform accepts, in rupiah.
pub const MINIMUM_TRANSFER_AMOUNT: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    BankTransfer,
    EWallet,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::EWallet => "E_WALLET",
            PaymentMethod::Cash => "CASH",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "BANK_TRANSFER" | "BANK" => Ok(PaymentMethod::BankTransfer),
            "E_WALLET" | "EWALLET" => Ok(PaymentMethod::EWallet),
            "CASH" => Ok(PaymentMethod::Cash),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub status: TransactionStatus,
    #[serde(rename = "paymentMethod", default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(rename = "paymentId", default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl Transaction {
    /// Amount with the sign of its effect on the balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Deposit => self.amount,
            TransactionType::Withdrawal => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopUpRequest {
    pub amount: u64,
    #[serde(rename = "paymentMethod")]
    pub payment_method: PaymentMethod,
}

impl TopUpRequest {
    /// Top ups are paid through a bank transfer or e-wallet; cash is not accepted.
    pub fn new(amount: u64, payment_method: PaymentMethod) -> Result<Self, ValidationError> {
        validate_transfer_amount(amount)?;
        if payment_method == PaymentMethod::Cash {
            return Err(ValidationError::UnsupportedPaymentMethod(
                payment_method.to_string(),
            ));
        }
        Ok(Self {
            amount,
            payment_method,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopUpData {
    pub transaction: Transaction,
    #[serde(rename = "redirectUrl")]
    pub redirect_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopUpResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: TopUpData,
    /// Payment gateway token for the checkout page.
    #[serde(rename = "token", default)]
    pub payment_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalRequest {
    pub amount: u64,
    #[serde(rename = "paymentMethod")]
    pub payment_method: PaymentMethod,
    pub description: String,
}

impl WithdrawalRequest {
    pub fn new(
        amount: u64,
        payment_method: PaymentMethod,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        validate_transfer_amount(amount)?;
        Ok(Self {
            amount,
            payment_method,
            description: description.into(),
        })
    }
}

/// Parse an amount typed by a user, e.g. `"Rp 50.000"`. Only the digits count.
pub fn parse_amount(text: &str) -> u64 {
    text.chars()
        .filter(|c| c.is_ascii_digit())
        .fold(0u64, |acc, c| {
            acc.saturating_mul(10)
                .saturating_add(u64::from(c as u8 - b'0'))
        })
}

pub fn validate_transfer_amount(amount: u64) -> Result<(), ValidationError> {
    if amount == 0 {
        return Err(ValidationError::InvalidAmount);
    }
    if amount < MINIMUM_TRANSFER_AMOUNT {
        return Err(ValidationError::BelowMinimum {
            minimum: format_rupiah(MINIMUM_TRANSFER_AMOUNT as f64),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("Rp 50.000"), 50_000);
        assert_eq!(parse_amount("1,000,000"), 1_000_000);
        assert_eq!(parse_amount(""), 0);
        assert_eq!(parse_amount("abc"), 0);
        assert_eq!(parse_amount("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_validate_transfer_amount() {
        assert_eq!(validate_transfer_amount(0), Err(ValidationError::InvalidAmount));
        assert_eq!(
            validate_transfer_amount(9_999),
            Err(ValidationError::BelowMinimum {
                minimum: "Rp 10.000".to_string()
            })
        );
        assert!(validate_transfer_amount(10_000).is_ok());
    }

    #[test]
    fn test_top_up_rejects_cash() {
        assert!(TopUpRequest::new(50_000, PaymentMethod::EWallet).is_ok());
        assert!(matches!(
            TopUpRequest::new(50_000, PaymentMethod::Cash),
            Err(ValidationError::UnsupportedPaymentMethod(_))
        ));
    }

    #[test]
    fn test_withdrawal_request_serialize() {
        let request = WithdrawalRequest::new(100_000, PaymentMethod::Cash, "Pickup at bank").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"amount": 100000, "paymentMethod": "CASH", "description": "Pickup at bank"})
        );
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("e-wallet".parse::<PaymentMethod>(), Ok(PaymentMethod::EWallet));
        assert_eq!("BANK_TRANSFER".parse::<PaymentMethod>(), Ok(PaymentMethod::BankTransfer));
        assert!("crypto".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_parse_top_up_response() {
        let json = r#"{"status":"success","message":"Top up created","data":{"transaction":{"id":"t-1","userId":"u-1","amount":50000,"type":"DEPOSIT","status":"PENDING","paymentMethod":"E_WALLET","paymentId":null,"description":"Top up","createdAt":"x","updatedAt":"y","user":{"id":"u-1","name":"Siti","phone":"0812","email":"siti@example.com"}},"redirectUrl":"https://pay.example.com/checkout/abc"},"token":"snap-token"}"#;
        let response: TopUpResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.redirect_url, "https://pay.example.com/checkout/abc");
        assert_eq!(response.data.transaction.kind, TransactionType::Deposit);
        assert_eq!(response.payment_token.as_deref(), Some("snap-token"));
    }

    #[test]
    fn test_signed_amount() {
        let json = r#"{"id":"t-2","userId":"u-1","amount":20000,"type":"WITHDRAWAL","status":"COMPLETED","paymentMethod":null,"paymentId":null,"description":null,"createdAt":"x","updatedAt":"y"}"#;
        let transaction: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(transaction.signed_amount(), -20000.0);
        assert_eq!(transaction.payment_method, None);
    }
}
