//! Entity catalog.
//!
//! Every collection handled by the store is described here: its collection
//! name, key fields, search/sort behavior, validation rules and delete mode.
//! Handlers and backends consult this catalog instead of hard-coding
//! per-entity behavior.

use std::fmt;

/// The entity kinds managed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Software assets / licenses (`software` collection).
    Software,
    /// Hardware inventory (`hardware` collection).
    Hardware,
    /// Voice-of-customer helpdesk tickets (`voc` collection).
    Voc,
    /// System update / solution development log (`solution` collection).
    SystemUpdate,
    /// Equipment connection projects (`connection` collection).
    EquipmentConnection,
    /// File attachment metadata (`attachments` collection).
    Attachment,
}

/// How a delete is performed for an entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// The document is physically removed.
    Hard,
    /// The document stays in the collection with `isDeleted = true`.
    Soft,
}

impl EntityKind {
    /// All entity kinds, in catalog order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Software,
        EntityKind::Hardware,
        EntityKind::Voc,
        EntityKind::SystemUpdate,
        EntityKind::EquipmentConnection,
        EntityKind::Attachment,
    ];

    /// The backing collection name.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Software => "software",
            EntityKind::Hardware => "hardware",
            EntityKind::Voc => "voc",
            EntityKind::SystemUpdate => "solution",
            EntityKind::EquipmentConnection => "connection",
            EntityKind::Attachment => "attachments",
        }
    }

    /// A short human-readable label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Software => "software",
            EntityKind::Hardware => "hardware",
            EntityKind::Voc => "voc",
            EntityKind::SystemUpdate => "system update",
            EntityKind::EquipmentConnection => "equipment connection",
            EntityKind::Attachment => "attachment",
        }
    }

    /// Name of the business code field, for kinds that carry one.
    pub fn code_field(&self) -> Option<&'static str> {
        match self {
            EntityKind::Software => Some("code"),
            EntityKind::Hardware => Some("code"),
            EntityKind::Voc => Some("code"),
            EntityKind::SystemUpdate => Some("updateCode"),
            EntityKind::EquipmentConnection => Some("code"),
            EntityKind::Attachment => None,
        }
    }

    /// Whether the store derives a code from `(regDate, no)` when absent.
    ///
    /// VOC tickets carry an optional, client-supplied code only.
    pub fn generates_code(&self) -> bool {
        matches!(
            self,
            EntityKind::Software
                | EntityKind::Hardware
                | EntityKind::SystemUpdate
                | EntityKind::EquipmentConnection
        )
    }

    /// Whether the kind carries a monotonically increasing `no` sequence.
    pub fn has_sequence(&self) -> bool {
        !matches!(self, EntityKind::Attachment)
    }

    /// Whether `no` must be unique within the collection.
    pub fn unique_no(&self) -> bool {
        matches!(self, EntityKind::Voc | EntityKind::SystemUpdate)
    }

    /// How deletes behave for this kind.
    pub fn delete_mode(&self) -> DeleteMode {
        match self {
            EntityKind::Software | EntityKind::EquipmentConnection => DeleteMode::Soft,
            _ => DeleteMode::Hard,
        }
    }

    /// Whether the kind carries the `saveStatus`/`modifiedStatus` flag pair.
    pub fn tracks_status_flags(&self) -> bool {
        !matches!(self, EntityKind::Attachment)
    }

    /// Fields covered by the free-text `search` query parameter.
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Software => &[
                "assetType",
                "assetName",
                "specification",
                "assetCode",
                "vendor",
                "licenseKey",
                "user",
                "detail",
                "remarks",
            ],
            EntityKind::Hardware => &[
                "code",
                "assetCode",
                "assetType",
                "assetName",
                "specification",
                "lotCode",
                "detail",
                "serialNumber",
                "currentUser",
                "remarks",
            ],
            EntityKind::Voc => &[
                "requestDept",
                "requester",
                "systemPath",
                "request",
                "action",
                "actionTeam",
                "actionPerson",
            ],
            EntityKind::SystemUpdate => &["updateCode", "description", "assignee", "remarks"],
            EntityKind::EquipmentConnection => &[
                "line",
                "equipment",
                "workType",
                "dataType",
                "connectionType",
                "detail",
                "remarks",
            ],
            EntityKind::Attachment => &[],
        }
    }

    /// Default sort fields for list queries, all descending.
    pub fn sort_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Software | EntityKind::EquipmentConnection => &["regDate", "no"],
            EntityKind::Attachment => &["uploadDate"],
            _ => &["no"],
        }
    }

    /// Fields that must be present and non-empty on insert.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Software => &["assetType", "assetName", "costType"],
            EntityKind::Hardware => &["executionType"],
            EntityKind::Voc => &["vocCategory", "requestType", "status"],
            EntityKind::SystemUpdate => &["targetSystem", "description", "updateType", "status"],
            EntityKind::EquipmentConnection => &[
                "line",
                "equipment",
                "workType",
                "dataType",
                "connectionType",
                "status",
            ],
            EntityKind::Attachment => &[
                "fileName",
                "originalFilename",
                "mimeType",
                "relatedEntityId",
                "relatedEntityType",
            ],
        }
    }

    /// Fields restricted to a fixed value set, with their allowed values.
    pub fn enum_fields(&self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            EntityKind::Hardware => &[(
                "executionType",
                &["신규구매", "사용불출", "수리중", "홀딩", "폐기"],
            )],
            _ => &[],
        }
    }

    /// Date-valued fields, normalized to RFC 3339 UTC at the API boundary.
    pub fn date_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Software => &["regDate", "startDate", "endDate"],
            EntityKind::Hardware => &["regDate", "purchaseDate", "warrantyDate"],
            EntityKind::Voc => &["regDate", "dueDate"],
            EntityKind::SystemUpdate => &["regDate", "completionDate"],
            EntityKind::EquipmentConnection => &["regDate", "startDate", "completionDate"],
            EntityKind::Attachment => &["uploadDate"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_modes() {
        assert_eq!(EntityKind::Software.delete_mode(), DeleteMode::Soft);
        assert_eq!(EntityKind::EquipmentConnection.delete_mode(), DeleteMode::Soft);
        assert_eq!(EntityKind::Hardware.delete_mode(), DeleteMode::Hard);
        assert_eq!(EntityKind::Voc.delete_mode(), DeleteMode::Hard);
        assert_eq!(EntityKind::SystemUpdate.delete_mode(), DeleteMode::Hard);
    }

    #[test]
    fn test_code_fields() {
        assert_eq!(EntityKind::SystemUpdate.code_field(), Some("updateCode"));
        assert_eq!(EntityKind::Attachment.code_field(), None);
        assert!(!EntityKind::Voc.generates_code());
        assert!(EntityKind::Voc.code_field().is_some());
    }

    #[test]
    fn test_collections_are_distinct() {
        let mut names: Vec<_> = EntityKind::ALL.iter().map(|k| k.collection()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EntityKind::ALL.len());
    }
}
