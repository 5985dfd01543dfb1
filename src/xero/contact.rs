//! Normalized view of a raw Xero contact payload.
//!
//! Raw records arrive as JSON from the Contacts endpoint; [`Contact`] keeps
//! the fields the export cares about and ignores the rest. [`Contact::flatten`]
//! projects the nested address/phone blocks into the flat view the CSV layer
//! consumes.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ─────────────────────────────────────────────────────────────────────────────
// Nested blocks
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of a contact's address list (Xero sends POBOX and STREET).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    #[serde(default)]
    pub address_type: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// One entry of a contact's phone list.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Phone {
    #[serde(default)]
    pub phone_type: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub phone_area_code: Option<String>,
    #[serde(default)]
    pub phone_country_code: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Contact
// ─────────────────────────────────────────────────────────────────────────────

/// A contact record as returned by the Contacts endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    #[serde(rename = "ContactID", default)]
    pub contact_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub contact_status: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub phones: Vec<Phone>,
}

/// The "main" address and phone of a contact projected into flat fields,
/// ready for CSV row building.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatContact {
    pub name: String,
    pub email_address: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone_area_code: Option<String>,
    pub phone_number: Option<String>,
}

impl Contact {
    /// Parses a raw record from the Contacts endpoint.
    ///
    /// Unknown fields are ignored; missing address/phone blocks become
    /// empty lists.
    pub fn from_raw(raw: serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(raw)
            .map_err(|e| AppError::Internal(format!("Failed to parse contact record: {}", e)))
    }

    /// The first address entry, which the export treats as the main one.
    pub fn main_address(&self) -> Option<&Address> {
        self.addresses.first()
    }

    /// The first phone entry carrying a number, falling back to the first
    /// entry. Xero often lists empty DDI/fax slots ahead of the real number.
    pub fn main_phone(&self) -> Option<&Phone> {
        self.phones
            .iter()
            .find(|p| p.phone_number.as_deref().is_some_and(|n| !n.is_empty()))
            .or_else(|| self.phones.first())
    }

    /// Flattens the main address and phone blocks into top-level fields.
    pub fn flatten(&self) -> FlatContact {
        let address = self.main_address();
        let phone = self.main_phone();

        FlatContact {
            name: self.name.clone(),
            email_address: self.email_address.clone(),
            address_line1: address.and_then(|a| a.address_line1.clone()),
            city: address.and_then(|a| a.city.clone()),
            region: address.and_then(|a| a.region.clone()),
            postal_code: address.and_then(|a| a.postal_code.clone()),
            country: address.and_then(|a| a.country.clone()),
            phone_area_code: phone.and_then(|p| p.phone_area_code.clone()),
            phone_number: phone.and_then(|p| p.phone_number.clone()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_contact() -> serde_json::Value {
        serde_json::json!({
            "ContactID": "a3f2c8d0-0000-0000-0000-000000000001",
            "ContactStatus": "ACTIVE",
            "Name": "Acme Pty Ltd",
            "EmailAddress": "accounts@acme.example",
            "BankAccountDetails": "ignored-by-the-model",
            "Addresses": [
                {
                    "AddressType": "STREET",
                    "AddressLine1": "1 Main St",
                    "City": "Melbourne",
                    "Region": "VIC",
                    "PostalCode": "3000",
                    "Country": "Australia"
                },
                {
                    "AddressType": "POBOX",
                    "AddressLine1": "PO Box 99",
                    "City": "Melbourne"
                }
            ],
            "Phones": [
                { "PhoneType": "DDI", "PhoneNumber": "", "PhoneAreaCode": "" },
                { "PhoneType": "DEFAULT", "PhoneNumber": "95551234", "PhoneAreaCode": "03" }
            ]
        })
    }

    #[test]
    fn from_raw_parses_a_realistic_payload() {
        let contact = Contact::from_raw(raw_contact()).unwrap();

        assert_eq!(contact.contact_id, "a3f2c8d0-0000-0000-0000-000000000001");
        assert_eq!(contact.name, "Acme Pty Ltd");
        assert_eq!(contact.email_address.as_deref(), Some("accounts@acme.example"));
        assert_eq!(contact.contact_status.as_deref(), Some("ACTIVE"));
        assert_eq!(contact.addresses.len(), 2);
        assert_eq!(contact.phones.len(), 2);
    }

    #[test]
    fn from_raw_tolerates_missing_blocks() {
        let contact = Contact::from_raw(serde_json::json!({
            "ContactID": "c9",
            "Name": "Bare Minimum Ltd"
        }))
        .unwrap();

        assert!(contact.addresses.is_empty());
        assert!(contact.phones.is_empty());
        assert!(contact.email_address.is_none());
        assert_eq!(contact.flatten().name, "Bare Minimum Ltd");
    }

    #[test]
    fn from_raw_rejects_non_object_payloads() {
        let result = Contact::from_raw(serde_json::json!("not a contact"));

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn main_address_is_the_first_entry() {
        let contact = Contact::from_raw(raw_contact()).unwrap();

        let main = contact.main_address().unwrap();
        assert_eq!(main.address_type.as_deref(), Some("STREET"));
        assert_eq!(main.address_line1.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn main_phone_skips_empty_numbers() {
        let contact = Contact::from_raw(raw_contact()).unwrap();

        let main = contact.main_phone().unwrap();
        assert_eq!(main.phone_number.as_deref(), Some("95551234"));
        assert_eq!(main.phone_area_code.as_deref(), Some("03"));
    }

    #[test]
    fn main_phone_falls_back_to_first_entry() {
        let contact = Contact {
            contact_id: "c1".into(),
            name: "No Numbers".into(),
            email_address: None,
            contact_status: None,
            addresses: vec![],
            phones: vec![Phone {
                phone_type: Some("FAX".into()),
                phone_number: None,
                phone_area_code: Some("02".into()),
                phone_country_code: None,
            }],
        };

        let main = contact.main_phone().unwrap();
        assert_eq!(main.phone_type.as_deref(), Some("FAX"));
    }

    #[test]
    fn flatten_projects_main_blocks() {
        let contact = Contact::from_raw(raw_contact()).unwrap();

        let flat = contact.flatten();

        assert_eq!(flat.name, "Acme Pty Ltd");
        assert_eq!(flat.address_line1.as_deref(), Some("1 Main St"));
        assert_eq!(flat.city.as_deref(), Some("Melbourne"));
        assert_eq!(flat.region.as_deref(), Some("VIC"));
        assert_eq!(flat.postal_code.as_deref(), Some("3000"));
        assert_eq!(flat.country.as_deref(), Some("Australia"));
        assert_eq!(flat.phone_area_code.as_deref(), Some("03"));
        assert_eq!(flat.phone_number.as_deref(), Some("95551234"));
    }

    #[test]
    fn flatten_with_no_blocks_is_all_empty() {
        let contact = Contact::from_raw(serde_json::json!({"ContactID": "c2"})).unwrap();

        let flat = contact.flatten();

        assert_eq!(flat, FlatContact::default());
    }
}
