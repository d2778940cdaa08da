//! Attachment upload, listing, download and deletion over the wire.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::Value;

use common::test_server;

fn upload_form(file_name: &str, contents: &'static [u8]) -> MultipartForm {
    MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(contents)
                .file_name(file_name)
                .mime_type("text/plain"),
        )
        .add_text("relatedEntityId", "voc-1")
        .add_text("relatedEntityType", "voc")
}

#[tokio::test]
async fn test_upload_and_download_round_trip() {
    let server = test_server();

    let res = server
        .post("/api/attachments")
        .multipart(upload_form("장애 보고서.txt", b"attachment payload"))
        .await;
    res.assert_status(StatusCode::CREATED);
    let metadata: Value = res.json();
    assert_eq!(metadata["originalFilename"], "장애 보고서.txt");
    assert_eq!(metadata["mimeType"], "text/plain");
    assert_eq!(metadata["size"], 18);
    assert!(metadata["uploadDate"].as_str().is_some());
    let id = metadata["_id"].as_str().unwrap().to_string();

    let res = server.get(&format!("/api/attachments/{id}/download")).await;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.as_bytes().as_ref(), b"attachment payload".as_slice());
    let disposition = res
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename*=UTF-8''"));
    // non-ASCII names are percent-encoded, never sent raw
    assert!(disposition.is_ascii());
}

#[tokio::test]
async fn test_download_survives_dotted_filenames() {
    let server = test_server();
    let created: Value = server
        .post("/api/attachments")
        .multipart(upload_form("backup..2024.tar.gz", b"archive"))
        .await
        .json();
    let id = created["_id"].as_str().unwrap().to_string();

    let res = server.get(&format!("/api/attachments/{id}/download")).await;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.as_bytes().as_ref(), b"archive".as_slice());

    server
        .delete(&format!("/api/attachments/{id}"))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_list_requires_both_related_params() {
    let server = test_server();
    server
        .get("/api/attachments")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/attachments")
        .add_query_param("relatedEntityId", "voc-1")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/attachments")
        .multipart(upload_form("a.txt", b"x"))
        .await
        .assert_status(StatusCode::CREATED);

    let listed: Value = server
        .get("/api/attachments")
        .add_query_param("relatedEntityId", "voc-1")
        .add_query_param("relatedEntityType", "voc")
        .await
        .json();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let listed: Value = server
        .get("/api/attachments")
        .add_query_param("relatedEntityId", "voc-2")
        .add_query_param("relatedEntityType", "voc")
        .await
        .json();
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_without_file_part_is_bad_request() {
    let server = test_server();
    let form = MultipartForm::new()
        .add_text("relatedEntityId", "voc-1")
        .add_text("relatedEntityType", "voc");
    server
        .post("/api/attachments")
        .multipart(form)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_removes_metadata_and_payload() {
    let server = test_server();
    let created: Value = server
        .post("/api/attachments")
        .multipart(upload_form("report.pdf", b"pdf bytes"))
        .await
        .json();
    let id = created["_id"].as_str().unwrap().to_string();

    let res = server.delete(&format!("/api/attachments/{id}")).await;
    res.assert_status(StatusCode::OK);
    let body: Value = res.json();
    assert_eq!(body["deletedAttachment"]["_id"], id.as_str());

    server
        .get(&format!("/api/attachments/{id}/download"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/api/attachments/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
