//! HTTP request handlers, one module per entity.

pub mod attachment;
pub mod equipment_connection;
pub mod hardware;
pub mod software;
pub mod system_update;
pub mod voc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use assetdesk_store::DocumentStore;

use crate::state::AppState;

/// Adds the `isSaved`/`isModified` projections to an outgoing document.
///
/// The stored fields are `saveStatus`/`modifiedStatus`; the aliases exist
/// only on the wire.
pub(crate) fn present(mut doc: Value) -> Value {
    if let Some(fields) = doc.as_object_mut() {
        if let Some(saved) = fields.get("saveStatus").cloned() {
            fields.insert("isSaved".to_string(), saved);
        }
        if let Some(modified) = fields.get("modifiedStatus").cloned() {
            fields.insert("isModified".to_string(), modified);
        }
    }
    doc
}

pub(crate) fn present_all(docs: Vec<Value>) -> Vec<Value> {
    docs.into_iter().map(present).collect()
}

/// Widens `startDate`/`endDate` request parameters to inclusive day bounds
/// in canonical form. Unparseable dates drop out of the filter.
pub(crate) fn range_bounds(
    start: Option<String>,
    end: Option<String>,
) -> (Option<String>, Option<String>) {
    (
        start.as_deref().and_then(assetdesk_store::time::start_of_day),
        end.as_deref().and_then(assetdesk_store::time::end_of_day),
    )
}

/// `GET /health` — liveness plus which storage engine is serving.
pub async fn health<S: DocumentStore>(State(state): State<AppState<S>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "store": state.store().mode().as_str(),
    }))
}

/// `GET /` — service banner.
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "assetdesk",
        "endpoints": [
            "/api/software",
            "/api/hardware",
            "/api/voc",
            "/api/system-updates",
            "/api/equipment-connections",
            "/api/attachments",
            "/health",
        ],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_projects_flags() {
        let doc = present(json!({"saveStatus": true, "modifiedStatus": false}));
        assert_eq!(doc["isSaved"], true);
        assert_eq!(doc["isModified"], false);
        assert_eq!(doc["saveStatus"], true);
    }

    #[test]
    fn test_present_skips_kinds_without_flags() {
        let doc = present(json!({"fileName": "a.pdf"}));
        assert!(doc.get("isSaved").is_none());
    }
}
