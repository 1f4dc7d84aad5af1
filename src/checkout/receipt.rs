use once_cell::sync::Lazy;
use regex::Regex;

use super::CheckoutError;

/// Field names surfaced to the buyer when extraction comes up short.
pub const REQUIRED_FIELDS: [&str; 4] = ["mobileNumber", "amount", "referenceNumber", "date"];

// Patterns match the GCash receipt layout: a +63 mobile number, an "Amount"
// label followed by a #,###.## figure, a "Ref No." in 4-3-6 digit groups, and
// a "Mon DD, YYYY" date.
static MOBILE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+63\s*\d{3}\s*\d{3}\s*\d{4}").unwrap());
static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Amount\s*(\d{1,3}(?:,\d{3})*\.\d{2})").unwrap());
static REF_NO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Ref\s*No\.\s*(\d{4}\s*\d{3}\s*\d{6})").unwrap());
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w{3}\s*\d{2},\s*\d{4})").unwrap());

/// Raw fields pulled out of one OCR run. Transient; only the parsed amount,
/// mobile number and reference number ever reach durable storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDetails {
    pub mobile_number: Option<String>,
    pub amount: Option<String>,
    pub reference_number: Option<String>,
    pub date: Option<String>,
}

pub fn extract_transaction_details(text: &str) -> TransactionDetails {
    TransactionDetails {
        mobile_number: MOBILE_NUMBER_RE.find(text).map(|m| m.as_str().to_string()),
        amount: AMOUNT_RE.captures(text).map(|c| c[1].to_string()),
        reference_number: REF_NO_RE.captures(text).map(|c| c[1].to_string()),
        date: DATE_RE.captures(text).map(|c| c[1].to_string()),
    }
}

/// A receipt that passed the validation gate.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedReceipt {
    pub mobile_number: String,
    pub amount: f32,
    pub reference_number: String,
}

/// Validation gate: all four fields must be present and the paid amount must
/// cover the shop group's computed total. Fails without touching any state.
pub fn validate_receipt(
    details: &TransactionDetails,
    required_total: f32,
) -> Result<VerifiedReceipt, CheckoutError> {
    let mut missing = Vec::new();
    if details.mobile_number.is_none() {
        missing.push(REQUIRED_FIELDS[0]);
    }
    if details.amount.is_none() {
        missing.push(REQUIRED_FIELDS[1]);
    }
    if details.reference_number.is_none() {
        missing.push(REQUIRED_FIELDS[2]);
    }
    if details.date.is_none() {
        missing.push(REQUIRED_FIELDS[3]);
    }
    if !missing.is_empty() {
        return Err(CheckoutError::MissingFields(missing));
    }

    let raw_amount = details.amount.as_deref().unwrap_or_default();
    let amount: f32 = raw_amount
        .replace(',', "")
        .parse()
        .map_err(|_| CheckoutError::MissingFields(vec![REQUIRED_FIELDS[1]]))?;

    if amount < required_total {
        return Err(CheckoutError::InsufficientPayment {
            minimum: required_total,
        });
    }

    Ok(VerifiedReceipt {
        mobile_number: details.mobile_number.clone().unwrap_or_default(),
        amount,
        reference_number: details.reference_number.clone().unwrap_or_default(),
    })
}

/// An OCR run that failed outright (engine error, timeout, garbage text) is
/// indistinguishable from a receipt with nothing extractable.
pub fn unusable() -> CheckoutError {
    CheckoutError::MissingFields(REQUIRED_FIELDS.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIPT_TEXT: &str = "\
        GCash\n\
        Sent to +63 917 123 4567\n\
        Amount 1,500.00\n\
        Total Amount Sent 1,500.00\n\
        Ref No. 1234 567 890123\n\
        Jan 15, 2025 3:42 PM\n";

    #[test]
    fn extracts_all_four_fields() {
        let details = extract_transaction_details(RECEIPT_TEXT);
        assert_eq!(details.mobile_number.as_deref(), Some("+63 917 123 4567"));
        assert_eq!(details.amount.as_deref(), Some("1,500.00"));
        assert_eq!(details.reference_number.as_deref(), Some("1234 567 890123"));
        assert_eq!(details.date.as_deref(), Some("Jan 15, 2025"));
    }

    #[test]
    fn missing_reference_number_is_listed_by_name() {
        let text = RECEIPT_TEXT.replace("Ref No. 1234 567 890123\n", "");
        let details = extract_transaction_details(&text);
        let err = validate_receipt(&details, 100.0).unwrap_err();
        assert_eq!(err, CheckoutError::MissingFields(vec!["referenceNumber"]));
        assert_eq!(
            err.to_string(),
            "Missing required fields: referenceNumber"
        );
    }

    #[test]
    fn unreadable_text_reports_every_field() {
        let details = extract_transaction_details("scanned static ####");
        let err = validate_receipt(&details, 100.0).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::MissingFields(vec![
                "mobileNumber",
                "amount",
                "referenceNumber",
                "date"
            ])
        );
        assert_eq!(err, unusable());
    }

    #[test]
    fn underpayment_references_required_minimum() {
        let details = TransactionDetails {
            mobile_number: Some("+63 917 123 4567".into()),
            amount: Some("500.00".into()),
            reference_number: Some("1234 567 890123".into()),
            date: Some("Jan 15, 2025".into()),
        };
        let err = validate_receipt(&details, 750.0).unwrap_err();
        assert_eq!(err, CheckoutError::InsufficientPayment { minimum: 750.0 });
        assert_eq!(
            err.to_string(),
            "Insufficient payment. Minimum amount is 750"
        );
    }

    #[test]
    fn thousands_separators_are_stripped_before_comparison() {
        let details = extract_transaction_details(RECEIPT_TEXT);
        let verified = validate_receipt(&details, 1500.0).unwrap();
        assert_eq!(verified.amount, 1500.0);
        assert_eq!(verified.reference_number, "1234 567 890123");
    }

    #[test]
    fn exact_amount_is_sufficient() {
        let details = extract_transaction_details(RECEIPT_TEXT);
        assert!(validate_receipt(&details, 1500.0).is_ok());
        assert!(validate_receipt(&details, 1500.01).is_err());
    }
}
