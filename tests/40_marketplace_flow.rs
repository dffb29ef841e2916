mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

/// Sign up a fresh student and return a bearer token.
async fn signup(server: &common::TestServer, prefix: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "email": common::unique_email(prefix),
            "password": "hunter2hunter2",
            "name": "Flow Tester"
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "signup failed");
    let body = res.json::<serde_json::Value>().await?;
    Ok(body["data"]["token"].as_str().expect("token").to_string())
}

#[tokio::test]
async fn teacher_application_starts_pending() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let token = signup(server, "applicant").await?;

    let res = client
        .post(format!("{}/api/teachers", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "headline": "Guitar teacher with 10 years on stage",
            "introduction": "I teach fingerstyle and theory.",
            "career_years": 10
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "pending");

    // Applying twice is a conflict
    let res = client
        .post(format!("{}/api/teachers", server.base_url))
        .bearer_auth(&token)
        .json(&json!({"headline": "Second application"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "TEACHER_PROFILE_EXISTS");
    Ok(())
}

#[tokio::test]
async fn unapproved_teachers_cannot_create_courses() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let token = signup(server, "unapproved").await?;

    let res = client
        .post(format!("{}/api/courses", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Premature course",
            "sub_category_id": 1,
            "is_online": true
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "TEACHER_NOT_APPROVED");
    Ok(())
}

#[tokio::test]
async fn slot_validation_rejects_bad_ranges() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let token = signup(server, "slots").await?;

    client
        .post(format!("{}/api/teachers", server.base_url))
        .bearer_auth(&token)
        .json(&json!({"headline": "Slot tester"}))
        .send()
        .await?;

    // end before start fails request validation
    let res = client
        .post(format!("{}/api/teachers/me/slots", server.base_url))
        .bearer_auth(&token)
        .json(&json!({"weekday": 2, "start_time": "15:00", "end_time": "14:00"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["end_time"].is_string());

    // weekday out of range
    let res = client
        .post(format!("{}/api/teachers/me/slots", server.base_url))
        .bearer_auth(&token)
        .json(&json!({"weekday": 9, "start_time": "09:00", "end_time": "10:00"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn overlapping_slots_conflict() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let token = signup(server, "overlap").await?;

    client
        .post(format!("{}/api/teachers", server.base_url))
        .bearer_auth(&token)
        .json(&json!({"headline": "Overlap tester"}))
        .send()
        .await?;

    let res = client
        .post(format!("{}/api/teachers/me/slots", server.base_url))
        .bearer_auth(&token)
        .json(&json!({"weekday": 3, "start_time": "09:00", "end_time": "12:00"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/api/teachers/me/slots", server.base_url))
        .bearer_auth(&token)
        .json(&json!({"weekday": 3, "start_time": "11:00", "end_time": "13:00"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "SLOT_OVERLAP");

    // Touching boundaries are fine
    let res = client
        .post(format!("{}/api/teachers/me/slots", server.base_url))
        .bearer_auth(&token)
        .json(&json!({"weekday": 3, "start_time": "12:00", "end_time": "13:00"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn empty_orders_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let token = signup(server, "emptyorder").await?;

    let res = client
        .post(format!("{}/api/orders", server.base_url))
        .bearer_auth(&token)
        .json(&json!({"items": []}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn fresh_accounts_have_no_purchases_or_reservations() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let token = signup(server, "fresh").await?;

    let res = client
        .get(format!("{}/api/purchases", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["total"], 0);

    // Teacher side of reservations is empty too, even without a profile
    let res = client
        .get(format!("{}/api/reservations?as=teacher", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn booking_requires_an_owned_purchase() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let token = signup(server, "nobooking").await?;

    let res = client
        .post(format!("{}/api/reservations", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "purchase_id": uuid::Uuid::new_v4(),
            "starts_at": "2030-01-07T10:00:00Z",
            "ends_at": "2030-01-07T11:00:00Z"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn reviews_require_an_owned_purchase() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let token = signup(server, "noreview").await?;

    let res = client
        .post(format!("{}/api/reviews", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "purchase_id": uuid::Uuid::new_v4(),
            "rating": 5,
            "comment": "Great, in theory"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Rating outside 1..=5 fails validation before any lookup
    let res = client
        .post(format!("{}/api/reviews", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "purchase_id": uuid::Uuid::new_v4(),
            "rating": 6
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}
