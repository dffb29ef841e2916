mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    // OK or SERVICE_UNAVAILABLE both count as liveness
    assert!(
        res.status() == StatusCode::OK || res.status() == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    assert!(body["success"].is_boolean());
    Ok(())
}

#[tokio::test]
async fn root_lists_endpoint_groups() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "TutorHub API");
    assert!(body["data"]["endpoints"]["courses"].is_string());
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api-docs/openapi.json", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert!(body["paths"]["/api/auth/signup"].is_object());
    assert!(body["paths"]["/api/reservations"].is_object());
    Ok(())
}

#[tokio::test]
async fn swagger_ui_is_served() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // /docs redirects to /docs/, which reqwest follows
    let res = client
        .get(format!("{}/docs", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await?;
    assert!(body.contains("swagger-ui"));
    Ok(())
}
