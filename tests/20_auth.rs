mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn signup_rejects_invalid_payload_with_field_errors() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "email": "not-an-email",
            "password": "short",
            "name": ""
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
    assert!(body["field_errors"]["password"].is_string());
    assert!(body["field_errors"]["name"].is_string());
    Ok(())
}

#[tokio::test]
async fn signup_rejects_malformed_json() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/api/auth/me", "/api/orders", "/api/reservations"] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {}", path);

        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/me", server.base_url))
        .bearer_auth("not.a.jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn signup_login_me_roundtrip() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let email = common::unique_email("roundtrip");

    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "email": email,
            "password": "hunter2hunter2",
            "name": "Roundtrip Tester"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], email.as_str());
    assert_eq!(body["data"]["user"]["role"], "student");
    // Hashes never leave the server
    assert!(body["data"]["user"].get("password_hash").is_none());

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({"email": email, "password": "hunter2hunter2"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let res = client
        .get(format!("{}/api/auth/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["email"], email.as_str());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let email = common::unique_email("duplicate");
    let payload = json!({
        "email": email,
        "password": "hunter2hunter2",
        "name": "First Mover"
    });

    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "EMAIL_TAKEN");
    Ok(())
}

#[tokio::test]
async fn deleted_account_releases_its_email() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let email = common::unique_email("comeback");

    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "email": email,
            "password": "hunter2hunter2",
            "name": "First Life"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let res = client
        .delete(format!("{}/api/users/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // The email is free again once the account is soft-deleted
    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "email": email,
            "password": "a-fresh-password",
            "name": "Second Life"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({"email": email, "password": "a-fresh-password"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let email = common::unique_email("badpass");

    client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "email": email,
            "password": "hunter2hunter2",
            "name": "Forgetful"
        }))
        .send()
        .await?;

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({"email": email, "password": "wrong-password"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
    Ok(())
}

#[tokio::test]
async fn user_tokens_are_rejected_on_admin_routes() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let email = common::unique_email("notadmin");

    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "email": email,
            "password": "hunter2hunter2",
            "name": "Not An Admin"
        }))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let res = client
        .get(format!("{}/api/admin/users", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}
