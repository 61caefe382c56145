use crate::e2e::helpers;

use helpers::{spawn_app, AppOptions, TestContext};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_pdf_results(ctx: &TestContext) {
    let response = ctx.client.get("/api/search?q=moby%20dick").await.unwrap();

    response.assert_status(StatusCode::OK);

    let results = response.body.as_ref().unwrap().as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0]["url"].as_str(),
        Some("https://example.com/moby-dick.pdf")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_query(ctx: &TestContext) {
    let response = ctx.client.get("/api/search?q=%20").await.unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Search query cannot be empty");
}

#[tokio::test]
async fn it_should_be_unavailable_when_not_configured() {
    let ctx = spawn_app(AppOptions {
        search_enabled: false,
        ..AppOptions::default()
    })
    .await
    .unwrap();

    let response = ctx.client.get("/api/search?q=moby").await.unwrap();

    response
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .assert_error_message("PDF search is not configured");
}
