//! Sample fixtures.
//!
//! Empty collections are seeded at startup so a fresh deployment (or the
//! volatile in-memory store) has data to browse. Inserts go through the full
//! write pipeline, so fixtures get codes and sequence numbers like any other
//! document.

use serde_json::{json, Value};
use tracing::info;

use crate::core::DocumentStore;
use crate::entity::EntityKind;
use crate::error::StoreResult;

fn fixtures(kind: EntityKind) -> Vec<Value> {
    match kind {
        EntityKind::Software => vec![
            json!({
                "assetType": "라이선스",
                "assetName": "MS Office 2021",
                "specification": "Home & Business",
                "costType": "구독",
                "vendor": "Microsoft",
                "user": "전산팀",
                "regDate": "2024-01-10",
                "remarks": "연간 갱신"
            }),
            json!({
                "assetType": "소프트웨어",
                "assetName": "AutoCAD LT",
                "costType": "영구",
                "vendor": "Autodesk",
                "user": "설비팀",
                "regDate": "2024-02-05"
            }),
        ],
        EntityKind::Hardware => vec![
            json!({
                "executionType": "신규구매",
                "assetType": "노트북",
                "assetName": "ThinkPad T14",
                "specification": "i7 / 32GB / 1TB",
                "serialNumber": "PF-3XK912",
                "currentUser": "김영수",
                "regDate": "2024-01-15"
            }),
            json!({
                "executionType": "사용불출",
                "assetType": "모니터",
                "assetName": "Dell U2723QE",
                "currentUser": "이민지",
                "regDate": "2024-02-20"
            }),
        ],
        EntityKind::Voc => vec![
            json!({
                "vocCategory": "시스템",
                "requestType": "신규",
                "status": "접수",
                "requestDept": "생산관리",
                "requester": "박준호",
                "request": "생산 실적 조회 화면 속도 개선 요청",
                "regDate": "2024-03-02"
            }),
            json!({
                "vocCategory": "전산장비",
                "requestType": "수정",
                "status": "완료",
                "requestDept": "품질보증",
                "requester": "최서연",
                "request": "측정기 PC 네트워크 장애",
                "action": "스위치 포트 교체",
                "actionTeam": "전산팀",
                "regDate": "2024-03-05"
            }),
        ],
        EntityKind::SystemUpdate => vec![
            json!({
                "targetSystem": "MES",
                "description": "작업지시 마감 배치 오류 수정",
                "updateType": "버그수정",
                "status": "완료",
                "assignee": "정우성",
                "regDate": "2024-02-28"
            }),
            json!({
                "targetSystem": "ERP",
                "description": "구매 발주 승인 단계 추가",
                "updateType": "기능개선",
                "status": "진행중",
                "assignee": "한지민",
                "regDate": "2024-03-11"
            }),
        ],
        EntityKind::EquipmentConnection => vec![
            json!({
                "line": "1라인",
                "equipment": "사출기 #3",
                "workType": "신규",
                "dataType": "PLC",
                "connectionType": "유선",
                "status": "진행중",
                "regDate": "2024-03-08"
            }),
            json!({
                "line": "2라인",
                "equipment": "검사기 #1",
                "workType": "변경",
                "dataType": "센서",
                "connectionType": "무선",
                "status": "완료",
                "regDate": "2024-03-12"
            }),
        ],
        EntityKind::Attachment => Vec::new(),
    }
}

/// Loads fixtures into every collection that is currently empty.
pub async fn seed_empty_collections<S: DocumentStore>(store: &S) -> StoreResult<()> {
    for kind in EntityKind::ALL {
        let docs = fixtures(kind);
        if docs.is_empty() || store.count(kind).await? > 0 {
            continue;
        }
        let loaded = docs.len();
        for doc in docs {
            store.insert(kind, doc).await?;
        }
        info!(collection = kind.collection(), loaded, "seeded sample documents");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use crate::facade::Store;
    use crate::query::Query;

    #[tokio::test]
    async fn test_seed_fills_empty_collections_once() {
        let store = Store::new(MemoryBackend::new());
        seed_empty_collections(&store).await.unwrap();
        assert_eq!(store.count(EntityKind::Software).await.unwrap(), 2);
        assert_eq!(store.count(EntityKind::Voc).await.unwrap(), 2);
        assert_eq!(store.count(EntityKind::Attachment).await.unwrap(), 0);

        // idempotent: a second pass does not duplicate
        seed_empty_collections(&store).await.unwrap();
        assert_eq!(store.count(EntityKind::Software).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_seeded_documents_carry_generated_codes() {
        let store = Store::new(MemoryBackend::new());
        seed_empty_collections(&store).await.unwrap();
        let docs = store.list(EntityKind::Hardware, Query::new()).await.unwrap();
        for doc in docs {
            let code = doc["code"].as_str().unwrap();
            assert!(code.starts_with("HW"), "unexpected code {code}");
        }
    }
}
