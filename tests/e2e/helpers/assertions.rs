use serde_json::Value;

pub fn assert_document_response(document: &Value, expected_state: &str) {
    assert!(document.get("id").and_then(|v| v.as_str()).is_some());
    assert!(document.get("title").and_then(|v| v.as_str()).is_some());
    assert!(document.get("text_length").and_then(|v| v.as_u64()).is_some());
    assert!(document.get("created_at").is_some());
    assert_eq!(
        document.get("state").and_then(|v| v.as_str()),
        Some(expected_state)
    );

    let progress = document
        .get("progress")
        .and_then(|v| v.as_f64())
        .expect("Missing progress");
    assert!((0.0..=1.0).contains(&progress));
}

pub fn assert_ready_document(document: &Value) {
    assert_document_response(document, "ready");
    assert_eq!(document.get("progress").and_then(|v| v.as_f64()), Some(1.0));
    assert!(document.get("audio_ref").and_then(|v| v.as_str()).is_some());
    assert!(document.get("image_ref").and_then(|v| v.as_str()).is_some());
    assert!(document.get("error_message").map_or(true, |v| v.is_null()));
}
