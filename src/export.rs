//! CSV export boundary: region filtering and row projection.
//!
//! The web layer owns file naming, cleanup, and delivery; this module only
//! turns fetched contacts into rows and writes them to a caller-supplied
//! writer.

use serde::Serialize;

use crate::error::AppError;
use crate::xero::contact::Contact;

// ─────────────────────────────────────────────────────────────────────────────
// Region filter
// ─────────────────────────────────────────────────────────────────────────────

/// Keeps only contacts whose main-address region (trimmed) equals `region`
/// (trimmed). Contacts without a region never match. `None` keeps
/// everything.
///
/// A pure filter over a new vector; the in-place removal this replaces
/// skipped entries while mutating the list it iterated.
pub fn filter_by_region(contacts: Vec<Contact>, region: Option<&str>) -> Vec<Contact> {
    let Some(wanted) = region else {
        return contacts;
    };
    let wanted = wanted.trim();

    contacts
        .into_iter()
        .filter(|contact| {
            contact
                .main_address()
                .and_then(|address| address.region.as_deref())
                .map(str::trim)
                .is_some_and(|region| region == wanted)
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Rows
// ─────────────────────────────────────────────────────────────────────────────

/// One CSV row of the export, column names matching the delivered file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "AddressLine")]
    pub address_line: String,
    #[serde(rename = "AddressArea")]
    pub address_area: String,
    #[serde(rename = "AddressPostcode")]
    pub address_postcode: String,
    #[serde(rename = "AddressState")]
    pub address_state: String,
    #[serde(rename = "AddressCountry")]
    pub address_country: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "EmailAddress")]
    pub email_address: String,
}

/// Projects contacts into export rows, keeping only those with both a street
/// address line and a phone number.
pub fn export_rows(contacts: &[Contact]) -> Vec<ExportRow> {
    contacts
        .iter()
        .filter_map(|contact| {
            let flat = contact.flatten();

            let address_line = flat.address_line1.filter(|line| !line.is_empty())?;
            let number = flat.phone_number.filter(|number| !number.is_empty())?;

            let phone = match flat.phone_area_code.as_deref() {
                Some(area) if !area.is_empty() => format!("{} {}", area, number),
                _ => number,
            };

            Some(ExportRow {
                name: flat.name,
                address_line,
                address_area: flat.city.unwrap_or_default(),
                address_postcode: flat.postal_code.unwrap_or_default(),
                address_state: flat.region.unwrap_or_default(),
                address_country: flat.country.unwrap_or_default(),
                phone,
                email_address: flat.email_address.unwrap_or_default(),
            })
        })
        .collect()
}

/// Writes rows as CSV, header row included, to any writer.
pub fn write_csv<W: std::io::Write>(rows: &[ExportRow], writer: W) -> Result<(), AppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| AppError::CsvExport(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| AppError::CsvExport(e.to_string()))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xero::contact::{Address, Phone};
    use std::io::Read;

    fn contact(id: &str, region: Option<&str>) -> Contact {
        Contact {
            contact_id: id.to_string(),
            name: format!("Contact {}", id),
            email_address: Some(format!("{}@example.com", id)),
            contact_status: Some("ACTIVE".into()),
            addresses: vec![Address {
                address_type: Some("STREET".into()),
                address_line1: Some("1 Main St".into()),
                address_line2: None,
                city: Some("Melbourne".into()),
                region: region.map(str::to_string),
                postal_code: Some("3000".into()),
                country: Some("Australia".into()),
            }],
            phones: vec![Phone {
                phone_type: Some("DEFAULT".into()),
                phone_number: Some("95551234".into()),
                phone_area_code: Some("03".into()),
                phone_country_code: None,
            }],
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Region filter
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn no_region_keeps_everything() {
        let contacts = vec![contact("c1", Some("VIC")), contact("c2", None)];

        let kept = filter_by_region(contacts, None);

        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn region_filter_keeps_only_matches() {
        let contacts = vec![
            contact("c1", Some("VIC")),
            contact("c2", Some("NSW")),
            contact("c3", Some("VIC")),
        ];

        let kept = filter_by_region(contacts, Some("VIC"));

        let ids: Vec<&str> = kept.iter().map(|c| c.contact_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
    }

    #[test]
    fn region_comparison_trims_whitespace() {
        let contacts = vec![contact("c1", Some(" VIC "))];

        let kept = filter_by_region(contacts, Some("VIC"));

        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn contacts_without_a_region_never_match() {
        let contacts = vec![contact("c1", None), contact("c2", Some("VIC"))];

        let kept = filter_by_region(contacts, Some("VIC"));

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].contact_id, "c2");
    }

    #[test]
    fn contacts_without_any_address_never_match() {
        let mut no_address = contact("c1", Some("VIC"));
        no_address.addresses.clear();

        let kept = filter_by_region(vec![no_address], Some("VIC"));

        assert!(kept.is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rows
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn rows_carry_the_flattened_fields() {
        let rows = export_rows(&[contact("c1", Some("VIC"))]);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "Contact c1");
        assert_eq!(row.address_line, "1 Main St");
        assert_eq!(row.address_area, "Melbourne");
        assert_eq!(row.address_postcode, "3000");
        assert_eq!(row.address_state, "VIC");
        assert_eq!(row.address_country, "Australia");
        assert_eq!(row.phone, "03 95551234");
        assert_eq!(row.email_address, "c1@example.com");
    }

    #[test]
    fn rows_require_an_address_line() {
        let mut incomplete = contact("c1", Some("VIC"));
        incomplete.addresses[0].address_line1 = None;

        let rows = export_rows(&[incomplete, contact("c2", Some("VIC"))]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Contact c2");
    }

    #[test]
    fn rows_require_a_phone_number() {
        let mut incomplete = contact("c1", Some("VIC"));
        incomplete.phones[0].phone_number = Some(String::new());

        let rows = export_rows(&[incomplete]);

        assert!(rows.is_empty());
    }

    #[test]
    fn phone_without_area_code_stands_alone() {
        let mut no_area = contact("c1", Some("VIC"));
        no_area.phones[0].phone_area_code = None;

        let rows = export_rows(&[no_area]);

        assert_eq!(rows[0].phone, "95551234");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // CSV writing
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn csv_output_has_header_and_rows() {
        let rows = export_rows(&[contact("c1", Some("VIC"))]);

        let mut buffer = Vec::new();
        write_csv(&rows, &mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Name,AddressLine,AddressArea,AddressPostcode,AddressState,AddressCountry,Phone,EmailAddress"
            )
        );
        let row = lines.next().unwrap();
        assert!(row.contains("Contact c1"));
        assert!(row.contains("03 95551234"));
    }

    #[test]
    fn empty_row_set_writes_nothing() {
        // Header comes from the first serialized record, so no rows means
        // an empty file
        let mut buffer = Vec::new();
        write_csv(&[], &mut buffer).unwrap();

        assert!(buffer.is_empty());
    }

    #[test]
    fn csv_round_trips_through_a_file() {
        let rows = export_rows(&[contact("c1", Some("VIC")), contact("c2", Some("NSW"))]);

        let mut file = tempfile::tempfile().unwrap();
        write_csv(&rows, &mut file).unwrap();

        use std::io::Seek;
        file.rewind().unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();

        assert_eq!(contents.lines().count(), 3);
        assert!(contents.contains("Contact c2"));
    }
}
