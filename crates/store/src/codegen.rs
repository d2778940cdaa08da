//! Business-code generation.
//!
//! Codes are pure functions of the registration date and the document's
//! sequence number, so a document re-inserted with the same `(regDate, no)`
//! pair always yields the same code. Formats are fixed per entity kind:
//!
//! | kind                 | format               | example          |
//! |----------------------|----------------------|------------------|
//! | software             | `SWM-YYMM-NNN`       | `SWM-2403-007`   |
//! | hardware             | `HWYYMMDD-NNNN`      | `HW240315-0012`  |
//! | equipment connection | `EQC-YYMM-NNN`       | `EQC-2403-003`   |
//! | system update        | `UPDYYMMNNN`         | `UPD2403001`     |

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::Value;

use crate::entity::EntityKind;

/// Derives the business code for a document, for kinds that generate one.
///
/// Returns `None` for kinds without server-side code generation.
pub fn generate_code(kind: EntityKind, reg_date: NaiveDate, no: i64) -> Option<String> {
    let yy = reg_date.year() % 100;
    let mm = reg_date.month();
    let dd = reg_date.day();
    match kind {
        EntityKind::Software => Some(format!("SWM-{yy:02}{mm:02}-{no:03}")),
        EntityKind::Hardware => Some(format!("HW{yy:02}{mm:02}{dd:02}-{no:04}")),
        EntityKind::EquipmentConnection => Some(format!("EQC-{yy:02}{mm:02}-{no:03}")),
        EntityKind::SystemUpdate => Some(format!("UPD{yy:02}{mm:02}{no:03}")),
        EntityKind::Voc | EntityKind::Attachment => None,
    }
}

/// Extracts the registration date of a document, falling back to today (UTC)
/// when the field is absent or unparseable.
pub fn registration_date(doc: &Value) -> NaiveDate {
    doc.get("regDate")
        .and_then(Value::as_str)
        .and_then(parse_date)
        .unwrap_or_else(|| Utc::now().date_naive())
}

/// Parses a date out of either a full RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(value.get(..10).unwrap_or(value), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_software_code_format() {
        assert_eq!(
            generate_code(EntityKind::Software, date(2024, 3, 15), 7),
            Some("SWM-2403-007".to_string())
        );
    }

    #[test]
    fn test_hardware_code_includes_day() {
        assert_eq!(
            generate_code(EntityKind::Hardware, date(2024, 3, 15), 12),
            Some("HW240315-0012".to_string())
        );
    }

    #[test]
    fn test_equipment_connection_code_format() {
        assert_eq!(
            generate_code(EntityKind::EquipmentConnection, date(2025, 11, 2), 3),
            Some("EQC-2511-003".to_string())
        );
    }

    #[test]
    fn test_system_update_code_has_no_separators() {
        assert_eq!(
            generate_code(EntityKind::SystemUpdate, date(2024, 3, 1), 1),
            Some("UPD2403001".to_string())
        );
    }

    #[test]
    fn test_wide_sequence_numbers_expand() {
        assert_eq!(
            generate_code(EntityKind::Software, date(2024, 3, 15), 1234),
            Some("SWM-2403-1234".to_string())
        );
    }

    #[test]
    fn test_voc_and_attachment_generate_nothing() {
        assert_eq!(generate_code(EntityKind::Voc, date(2024, 3, 15), 1), None);
        assert_eq!(generate_code(EntityKind::Attachment, date(2024, 3, 15), 1), None);
    }

    #[test]
    fn test_registration_date_from_rfc3339() {
        let doc = json!({"regDate": "2024-03-15T10:00:00.000Z"});
        assert_eq!(registration_date(&doc), date(2024, 3, 15));
    }

    #[test]
    fn test_registration_date_from_bare_date() {
        let doc = json!({"regDate": "2024-03-15"});
        assert_eq!(registration_date(&doc), date(2024, 3, 15));
    }

    #[test]
    fn test_registration_date_falls_back_to_today() {
        let doc = json!({"regDate": "not a date"});
        assert_eq!(registration_date(&doc), Utc::now().date_naive());
        assert_eq!(registration_date(&json!({})), Utc::now().date_naive());
    }
}
