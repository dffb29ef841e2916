mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn cities_and_categories_are_public() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/catalog/cities", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());

    let res = client
        .get(format!("{}/api/catalog/categories", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["data"].is_array());
    // Each node nests its subcategories
    if let Some(first) = body["data"].as_array().and_then(|a| a.first()) {
        assert!(first["sub_categories"].is_array());
    }
    Ok(())
}

#[tokio::test]
async fn course_search_returns_a_page_envelope() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/api/courses?keyword=guitar&page=1&per_page=5",
            server.base_url
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["items"].is_array());
    assert!(body["data"]["total"].is_number());
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["per_page"], 5);
    Ok(())
}

#[tokio::test]
async fn per_page_is_capped() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/courses?per_page=10000", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["per_page"], 100);
    Ok(())
}

#[tokio::test]
async fn unknown_course_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/api/courses/{}",
            server.base_url,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn unknown_teacher_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/api/teachers/{}",
            server.base_url,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
