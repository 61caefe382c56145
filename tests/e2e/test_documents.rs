use crate::e2e::helpers;

use audify_backend::domain::tts::{split, AudioFormat};
use helpers::assertions::{assert_document_response, assert_ready_document};
use helpers::{document_id, spawn_app, AppOptions, TestContext};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::Ordering;
use test_context::test_context;

const SHORT_TEXT: &str = "Hello world. This is Audify.";

const LONG_TEXT: &str = "Call me Ishmael. Some years ago, never mind how long precisely, \
having little or no money in my purse, and nothing particular to interest me on shore, \
I thought I would sail about a little and see the watery part of the world. It is a way \
I have of driving off the spleen and regulating the circulation.";

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_audio_and_metadata_for_new_document(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/documents",
            &json!({ "title": "scan_0001", "text": SHORT_TEXT }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);
    let created = response.body.clone().unwrap();
    assert_document_response(&created, "processing");
    assert_eq!(created["title"], "scan_0001");

    let document = ctx.wait_for_settled(&document_id(&created)).await;

    assert_ready_document(&document);
    assert_eq!(document["title"], "Moby Dick");
    assert_eq!(document["author"], "Herman Melville");
    assert_eq!(ctx.tts.calls.load(Ordering::SeqCst), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_audio_in_chunk_order(ctx: &TestContext) {
    let created = ctx.create_document("scan_0002", LONG_TEXT).await;
    let id = document_id(&created);
    ctx.wait_for_settled(&id).await;

    let response = ctx
        .client
        .get(&format!("/api/documents/{}/audio", id))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg");

    let chunks = split(LONG_TEXT, 64).unwrap();
    assert!(chunks.len() > 1);
    let expected: Vec<u8> = chunks
        .iter()
        .flat_map(|chunk| format!("[{}]", chunk.text).into_bytes())
        .collect();
    assert_eq!(response.body_bytes, expected);
    assert_eq!(ctx.tts.calls.load(Ordering::SeqCst), chunks.len());
}

#[tokio::test]
async fn it_should_serve_audio_in_configured_encoding() {
    let ctx = spawn_app(AppOptions {
        audio_format: AudioFormat::OggOpus,
        ..AppOptions::default()
    })
    .await
    .unwrap();

    let created = ctx.create_document("scan_0013", SHORT_TEXT).await;
    let id = document_id(&created);
    let document = ctx.wait_for_settled(&id).await;
    assert!(document["audio_ref"].as_str().unwrap().ends_with(".ogg"));

    let response = ctx
        .client
        .get(&format!("/api/documents/{}/audio", id))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/ogg");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_cover_image(ctx: &TestContext) {
    let created = ctx.create_document("scan_0003", SHORT_TEXT).await;
    let id = document_id(&created);
    ctx.wait_for_settled(&id).await;

    let response = ctx
        .client
        .get(&format!("/api/documents/{}/image", id))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "image/jpeg");
    assert_eq!(response.body_bytes, b"\xFF\xD8\xFFcover".to_vec());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_without_touching_content_when_metadata_fails(ctx: &TestContext) {
    ctx.metadata.failing.store(true, Ordering::SeqCst);

    let created = ctx.create_document("scan_0004", SHORT_TEXT).await;
    let id = document_id(&created);
    let document = ctx.wait_for_settled(&id).await;

    assert_document_response(&document, "failed");
    assert_eq!(document["title"], "scan_0004");
    assert!(document["author"].is_null());
    assert!(document["audio_ref"].is_null());
    assert!(document["image_ref"].is_null());
    assert!(document["error_message"]
        .as_str()
        .unwrap()
        .starts_with("Metadata extraction failed"));

    let response = ctx
        .client
        .get(&format!("/api/documents/{}/audio", id))
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_surface_synthesis_errors(ctx: &TestContext) {
    ctx.tts.failing.store(true, Ordering::SeqCst);

    let created = ctx.create_document("scan_0005", LONG_TEXT).await;
    let document = ctx.wait_for_settled(&document_id(&created)).await;

    assert_document_response(&document, "failed");
    assert!(document["audio_ref"].is_null());
    let message = document["error_message"].as_str().unwrap();
    assert!(message.starts_with("Speech synthesis failed"));
    assert!(message.contains("Sentence is too long"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_retry_failed_document(ctx: &TestContext) {
    ctx.metadata.failing.store(true, Ordering::SeqCst);

    let created = ctx.create_document("scan_0006", SHORT_TEXT).await;
    let id = document_id(&created);
    ctx.wait_for_settled(&id).await;

    ctx.metadata.failing.store(false, Ordering::SeqCst);

    let response = ctx
        .client
        .post_empty(&format!("/api/documents/{}/retry", id))
        .await
        .unwrap();
    response.assert_status(StatusCode::ACCEPTED);
    let retried = response.body.clone().unwrap();
    assert_document_response(&retried, "processing");
    assert!(retried["error_message"].is_null());

    let document = ctx.wait_for_settled(&id).await;
    assert_ready_document(&document);
    assert_eq!(document["title"], "Moby Dick");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_retry_and_generate_for_ready_document(ctx: &TestContext) {
    let created = ctx.create_document("scan_0007", SHORT_TEXT).await;
    let id = document_id(&created);
    ctx.wait_for_settled(&id).await;

    let response = ctx
        .client
        .post_empty(&format!("/api/documents/{}/retry", id))
        .await
        .unwrap();
    response
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("Only failed documents can be retried");

    let response = ctx
        .client
        .post_empty(&format!("/api/documents/{}/generate", id))
        .await
        .unwrap();
    response.assert_status(StatusCode::CONFLICT);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_generate_while_processing(ctx: &TestContext) {
    ctx.tts.delay_ms.store(200, Ordering::SeqCst);

    let created = ctx.create_document("scan_0008", SHORT_TEXT).await;
    let id = document_id(&created);

    let response = ctx
        .client
        .post_empty(&format!("/api/documents/{}/generate", id))
        .await
        .unwrap();
    response
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("cannot be generated while processing");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_blank_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/documents",
            &json!({ "title": "blank", "text": "   \n\t " }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("No readable text found");

    let response = ctx.client.get("/api/documents").await.unwrap();
    assert_eq!(response.body.unwrap().as_array().unwrap().len(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_documents_newest_first(ctx: &TestContext) {
    let first = ctx.create_document("first", SHORT_TEXT).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = ctx.create_document("second", SHORT_TEXT).await;

    let response = ctx.client.get("/api/documents").await.unwrap();
    response.assert_status(StatusCode::OK);

    let ids: Vec<String> = response
        .body
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(document_id)
        .collect();
    assert_eq!(ids, vec![document_id(&second), document_id(&first)]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_delete_document_and_its_audio(ctx: &TestContext) {
    let created = ctx.create_document("scan_0009", SHORT_TEXT).await;
    let id = document_id(&created);
    ctx.wait_for_settled(&id).await;

    let response = ctx
        .client
        .delete(&format!("/api/documents/{}", id))
        .await
        .unwrap();
    response.assert_status(StatusCode::NO_CONTENT);

    let response = ctx
        .client
        .get(&format!("/api/documents/{}", id))
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);

    let response = ctx
        .client
        .get(&format!("/api/documents/{}/audio", id))
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_cancel_generation_on_delete(ctx: &TestContext) {
    ctx.tts.delay_ms.store(200, Ordering::SeqCst);

    let created = ctx.create_document("scan_0010", LONG_TEXT).await;
    let id = document_id(&created);

    let response = ctx
        .client
        .delete(&format!("/api/documents/{}", id))
        .await
        .unwrap();
    response.assert_status(StatusCode::NO_CONTENT);

    tokio::time::sleep(std::time::Duration::from_millis(400)).await;

    let response = ctx
        .client
        .get(&format!("/api/documents/{}", id))
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);

    let response = ctx.client.get("/api/documents").await.unwrap();
    assert_eq!(response.body.unwrap().as_array().unwrap().len(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_document(ctx: &TestContext) {
    let path = format!("/api/documents/{}", uuid::Uuid::new_v4());

    ctx.client
        .get(&path)
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Document not found");

    ctx.client
        .delete(&path)
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);

    ctx.client
        .post_empty(&format!("{}/generate", path))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_record_playback_offset(ctx: &TestContext) {
    let created = ctx.create_document("scan_0011", SHORT_TEXT).await;
    let id = document_id(&created);

    let response = ctx
        .client
        .put(
            &format!("/api/documents/{}/playback", id),
            &json!({ "offset_seconds": 93.5 }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::NO_CONTENT);

    let response = ctx
        .client
        .get(&format!("/api/documents/{}", id))
        .await
        .unwrap();
    assert_eq!(response.body.unwrap()["last_playback_offset"], 93.5);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_negative_playback_offset(ctx: &TestContext) {
    let created = ctx.create_document("scan_0012", SHORT_TEXT).await;

    let response = ctx
        .client
        .put(
            &format!("/api/documents/{}/playback", document_id(&created)),
            &json!({ "offset_seconds": -4.0 }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}
