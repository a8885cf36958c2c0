//! Build transfer command
//!
//! Validates a transfer request and renders it as a
//! `PaymentRequestMessage` XML document.
//!
//! Sentinel defaults are omitted from the output: `payment_type` 99 and
//! `charge_details` "SHA" are what the receiving system assumes when the
//! elements are absent, and an empty notes list produces no `Notes`
//! element at all.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::shared::validation::{
    validate_currency, validate_required, FieldValidationError,
};

/// Payment type assumed by the receiver when the element is absent
const DEFAULT_PAYMENT_TYPE: i32 = 99;
/// Charge details assumed by the receiver when the element is absent
const DEFAULT_CHARGE_DETAILS: &str = "SHA";

/// Command to build a payment transfer document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTransferCommand {
    pub reference: String,
    /// Opaque timestamp string, passed through unaltered
    pub date: String,
    pub amount: Decimal,
    /// 3-letter ISO 4217 code
    pub currency: String,
    pub sender_account: String,
    pub receiver_bank_code: String,
    pub receiver_account: String,
    pub beneficiary_name: String,
    #[serde(default)]
    pub notes: Vec<String>,
    pub payment_type: Option<i32>,
    pub charge_details: Option<String>,
}

/// Error type for the build transfer command
#[derive(Debug, Error)]
pub enum BuildTransferError {
    #[error(transparent)]
    Validation(#[from] FieldValidationError),

    #[error("amount cannot be negative")]
    NegativeAmount,

    #[error("failed to render payment document: {0}")]
    Xml(String),
}

#[derive(Debug, Serialize)]
#[serde(rename = "PaymentRequestMessage")]
struct PaymentRequestMessage {
    #[serde(rename = "TransferInfo")]
    transfer_info: TransferInfo,
    #[serde(rename = "SenderInfo")]
    sender_info: SenderInfo,
    #[serde(rename = "ReceiverInfo")]
    receiver_info: ReceiverInfo,
    #[serde(rename = "Notes", skip_serializing_if = "Option::is_none")]
    notes: Option<Notes>,
    #[serde(rename = "PaymentType", skip_serializing_if = "Option::is_none")]
    payment_type: Option<i32>,
    #[serde(rename = "ChargeDetails", skip_serializing_if = "Option::is_none")]
    charge_details: Option<String>,
}

#[derive(Debug, Serialize)]
struct TransferInfo {
    #[serde(rename = "Reference")]
    reference: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Amount")]
    amount: Decimal,
    #[serde(rename = "Currency")]
    currency: String,
}

#[derive(Debug, Serialize)]
struct SenderInfo {
    #[serde(rename = "AccountNumber")]
    account_number: String,
}

#[derive(Debug, Serialize)]
struct ReceiverInfo {
    #[serde(rename = "BankCode")]
    bank_code: String,
    #[serde(rename = "AccountNumber")]
    account_number: String,
    #[serde(rename = "BeneficiaryName")]
    beneficiary_name: String,
}

#[derive(Debug, Serialize)]
struct Notes {
    #[serde(rename = "Note")]
    notes: Vec<String>,
}

fn validate(command: &BuildTransferCommand) -> Result<(), BuildTransferError> {
    validate_required(&command.reference, "reference", 255)?;
    validate_required(&command.date, "date", 255)?;
    validate_currency(&command.currency, "currency")?;
    validate_required(&command.sender_account, "sender_account", 255)?;
    validate_required(&command.receiver_bank_code, "receiver_bank_code", 255)?;
    validate_required(&command.receiver_account, "receiver_account", 255)?;
    validate_required(&command.beneficiary_name, "beneficiary_name", 255)?;

    if command.amount.is_sign_negative() {
        return Err(BuildTransferError::NegativeAmount);
    }

    Ok(())
}

pub fn handle(command: BuildTransferCommand) -> Result<String, BuildTransferError> {
    validate(&command)?;

    let payment_type = command.payment_type.filter(|&t| t != DEFAULT_PAYMENT_TYPE);
    let charge_details = command
        .charge_details
        .filter(|c| c != DEFAULT_CHARGE_DETAILS);
    let notes = if command.notes.is_empty() {
        None
    } else {
        Some(Notes {
            notes: command.notes,
        })
    };

    let message = PaymentRequestMessage {
        transfer_info: TransferInfo {
            reference: command.reference,
            date: command.date,
            amount: command.amount,
            currency: command.currency,
        },
        sender_info: SenderInfo {
            account_number: command.sender_account,
        },
        receiver_info: ReceiverInfo {
            bank_code: command.receiver_bank_code,
            account_number: command.receiver_account,
            beneficiary_name: command.beneficiary_name,
        },
        notes,
        payment_type,
        charge_details,
    };

    let body = quick_xml::se::to_string(&message)
        .map_err(|e| BuildTransferError::Xml(e.to_string()))?;

    Ok(format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn command() -> BuildTransferCommand {
        BuildTransferCommand {
            reference: "e0f4763d-28ea-42d4-ac1c-c4013c242105".to_string(),
            date: "2025-02-25 06:33:00+03".to_string(),
            amount: dec!(177.39),
            currency: "SAR".to_string(),
            sender_account: "SA6980000204608016212908".to_string(),
            receiver_bank_code: "FDCSSARI".to_string(),
            receiver_account: "SA6980000204608016211111".to_string(),
            beneficiary_name: "Jane Doe".to_string(),
            notes: vec![],
            payment_type: None,
            charge_details: None,
        }
    }

    #[test]
    fn test_renders_all_fields() {
        let xml = handle(BuildTransferCommand {
            notes: vec!["Lorem Epsum".to_string(), "Dolor Sit Amet".to_string()],
            payment_type: Some(421),
            charge_details: Some("RB".to_string()),
            ..command()
        })
        .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<PaymentRequestMessage>"));
        assert!(xml.contains("<Reference>e0f4763d-28ea-42d4-ac1c-c4013c242105</Reference>"));
        assert!(xml.contains("<Date>2025-02-25 06:33:00+03</Date>"));
        assert!(xml.contains("<Amount>177.39</Amount>"));
        assert!(xml.contains("<Currency>SAR</Currency>"));
        assert!(xml.contains("<AccountNumber>SA6980000204608016212908</AccountNumber>"));
        assert!(xml.contains("<BankCode>FDCSSARI</BankCode>"));
        assert!(xml.contains("<BeneficiaryName>Jane Doe</BeneficiaryName>"));
        assert!(xml.contains("<Note>Lorem Epsum</Note>"));
        assert!(xml.contains("<Note>Dolor Sit Amet</Note>"));
        assert!(xml.contains("<PaymentType>421</PaymentType>"));
        assert!(xml.contains("<ChargeDetails>RB</ChargeDetails>"));
    }

    #[test]
    fn test_excludes_notes_when_empty() {
        let xml = handle(command()).unwrap();
        assert!(!xml.contains("<Notes>"));
        assert!(!xml.contains("<Note>"));
    }

    #[test]
    fn test_excludes_payment_type_when_default() {
        let xml = handle(BuildTransferCommand {
            payment_type: Some(99),
            ..command()
        })
        .unwrap();
        assert!(!xml.contains("<PaymentType>"));
    }

    #[test]
    fn test_excludes_charge_details_when_default() {
        let xml = handle(BuildTransferCommand {
            charge_details: Some("SHA".to_string()),
            ..command()
        })
        .unwrap();
        assert!(!xml.contains("<ChargeDetails>"));
    }

    #[test]
    fn test_escapes_text_content() {
        let xml = handle(BuildTransferCommand {
            beneficiary_name: "Smith & Sons <Ltd>".to_string(),
            ..command()
        })
        .unwrap();
        assert!(xml.contains("Smith &amp; Sons &lt;Ltd&gt;"));
    }

    #[test]
    fn test_rejects_negative_amount() {
        let result = handle(BuildTransferCommand {
            amount: dec!(-1.00),
            ..command()
        });
        assert!(matches!(result, Err(BuildTransferError::NegativeAmount)));
    }

    #[test]
    fn test_rejects_blank_reference() {
        let result = handle(BuildTransferCommand {
            reference: "  ".to_string(),
            ..command()
        });
        assert!(matches!(result, Err(BuildTransferError::Validation(_))));
    }

    #[test]
    fn test_rejects_bad_currency() {
        let result = handle(BuildTransferCommand {
            currency: "SAUDI".to_string(),
            ..command()
        });
        assert!(matches!(result, Err(BuildTransferError::Validation(_))));
    }
}
