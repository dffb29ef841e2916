mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// 2030-01-07 is a Monday, matching the weekday-0 slot below
const MONDAY_10_TO_11: (&str, &str) = ("2030-01-07T10:00:00Z", "2030-01-07T11:00:00Z");
const MONDAY_11_TO_12: (&str, &str) = ("2030-01-07T11:00:00Z", "2030-01-07T12:00:00Z");
const MONDAY_13_TO_14: (&str, &str) = ("2030-01-07T13:00:00Z", "2030-01-07T14:00:00Z");
const MONDAY_1130_TO_1230: (&str, &str) = ("2030-01-07T11:30:00Z", "2030-01-07T12:30:00Z");
const TUESDAY_10_TO_11: (&str, &str) = ("2030-01-08T10:00:00Z", "2030-01-08T11:00:00Z");

async fn signup(server: &common::TestServer, prefix: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "email": common::unique_email(prefix),
            "password": "hunter2hunter2",
            "name": "Booking Tester"
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "signup failed");
    let body = res.json::<serde_json::Value>().await?;
    Ok(body["data"]["token"].as_str().expect("token").to_string())
}

async fn admin_login(server: &common::TestServer) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/admin/login", server.base_url))
        .json(&json!({
            "email": common::ADMIN_EMAIL,
            "password": common::ADMIN_PASSWORD
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "admin login failed");
    let body = res.json::<serde_json::Value>().await?;
    Ok(body["data"]["token"].as_str().expect("token").to_string())
}

async fn book(
    server: &common::TestServer,
    token: &str,
    purchase_id: &str,
    window: (&str, &str),
) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    Ok(client
        .post(format!("{}/api/reservations", server.base_url))
        .bearer_auth(token)
        .json(&json!({
            "purchase_id": purchase_id,
            "starts_at": window.0,
            "ends_at": window.1
        }))
        .send()
        .await?)
}

async fn remaining_sessions(server: &common::TestServer, token: &str) -> Result<i64> {
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/purchases", server.base_url))
        .bearer_auth(token)
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    Ok(body["data"]["items"][0]["quantity_remaining"]
        .as_i64()
        .expect("quantity_remaining"))
}

/// The whole marketplace in one pass: a teacher gets approved and lists a
/// course, a student pays for a session pack and books, cancels, and
/// rebooks against the teacher's availability.
#[tokio::test]
async fn paid_order_booking_round_trip() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        eprintln!("skipping: no database behind the server");
        return Ok(());
    }
    common::ensure_fixtures()?;
    let client = reqwest::Client::new();

    // Teacher applies, an admin approves
    let teacher_token = signup(server, "flow.teacher").await?;
    let res = client
        .post(format!("{}/api/teachers", server.base_url))
        .bearer_auth(&teacher_token)
        .json(&json!({
            "headline": "Guitar teacher for the full booking flow",
            "career_years": 7
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let teacher_id = body["data"]["id"].as_str().expect("teacher id").to_string();

    let admin_token = admin_login(server).await?;
    let res = client
        .post(format!(
            "{}/api/admin/teachers/{}/approve",
            server.base_url, teacher_id
        ))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "approved");

    // Availability: Mondays 09:00-17:00
    let res = client
        .post(format!("{}/api/teachers/me/slots", server.base_url))
        .bearer_auth(&teacher_token)
        .json(&json!({"weekday": 0, "start_time": "09:00", "end_time": "17:00"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Course with a two-session pack
    let res = client
        .get(format!("{}/api/catalog/categories", server.base_url))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let sub_category_id = body["data"][0]["sub_categories"][0]["id"]
        .as_i64()
        .expect("sub category id");

    let res = client
        .post(format!("{}/api/courses", server.base_url))
        .bearer_auth(&teacher_token)
        .json(&json!({
            "title": "Fingerstyle guitar from scratch",
            "description": "Two sessions to get you through your first song.",
            "sub_category_id": sub_category_id,
            "is_online": true
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let course_id = body["data"]["id"].as_str().expect("course id").to_string();

    let res = client
        .post(format!(
            "{}/api/courses/{}/price-options",
            server.base_url, course_id
        ))
        .bearer_auth(&teacher_token)
        .json(&json!({"price": 5000, "quantity": 2}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let option_id = body["data"]["id"].as_str().expect("option id").to_string();

    // Student orders the pack and pays
    let student_token = signup(server, "flow.student").await?;
    let res = client
        .post(format!("{}/api/orders", server.base_url))
        .bearer_auth(&student_token)
        .json(&json!({
            "items": [{"course_id": course_id, "price_option_id": option_id}]
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let order_id = body["data"]["id"].as_str().expect("order id").to_string();
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["total_amount"], 5000);

    let res = client
        .post(format!("{}/api/orders/{}/pay", server.base_url, order_id))
        .bearer_auth(&student_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "paid");

    // Paying mints the purchase with the snapshotted session count
    let res = client
        .get(format!("{}/api/purchases", server.base_url))
        .bearer_auth(&student_token)
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["total"], 1);
    let purchase = &body["data"]["items"][0];
    assert_eq!(purchase["quantity_total"], 2);
    assert_eq!(purchase["quantity_remaining"], 2);
    let purchase_id = purchase["id"].as_str().expect("purchase id").to_string();

    // Booking consumes a session
    let res = book(server, &student_token, &purchase_id, MONDAY_10_TO_11).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let reservation_id = body["data"]["id"].as_str().expect("reservation id").to_string();
    assert_eq!(body["data"]["status"], "requested");
    assert_eq!(remaining_sessions(server, &student_token).await?, 1);

    // Second session goes to another window; the pack is now exhausted
    let res = book(server, &student_token, &purchase_id, MONDAY_11_TO_12).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(remaining_sessions(server, &student_token).await?, 0);

    let res = book(server, &student_token, &purchase_id, MONDAY_13_TO_14).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "NO_SESSIONS_LEFT");

    // Cancel refunds the session and frees the window
    let res = client
        .post(format!(
            "{}/api/reservations/{}/cancel",
            server.base_url, reservation_id
        ))
        .bearer_auth(&student_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "canceled");
    assert_eq!(remaining_sessions(server, &student_token).await?, 1);

    // Outside the Monday slot is rejected while sessions remain
    let res = book(server, &student_token, &purchase_id, TUESDAY_10_TO_11).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "OUTSIDE_AVAILABILITY");

    // The still-active 11:00-12:00 booking blocks overlapping windows
    let res = book(server, &student_token, &purchase_id, MONDAY_1130_TO_1230).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "RESERVATION_CONFLICT");

    // Canceled reservations no longer block their window
    let res = book(server, &student_token, &purchase_id, MONDAY_10_TO_11).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let rebooked_id = body["data"]["id"].as_str().expect("reservation id").to_string();
    assert_eq!(remaining_sessions(server, &student_token).await?, 0);

    // Teacher confirms; the student sees the updated status
    let res = client
        .post(format!(
            "{}/api/reservations/{}/confirm",
            server.base_url, rebooked_id
        ))
        .bearer_auth(&teacher_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "confirmed");

    let res = client
        .get(format!(
            "{}/api/reservations/{}",
            server.base_url, rebooked_id
        ))
        .bearer_auth(&student_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "confirmed");

    // Completing before the session ends is an invalid transition
    let res = client
        .post(format!(
            "{}/api/reservations/{}/complete",
            server.base_url, rebooked_id
        ))
        .bearer_auth(&teacher_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "INVALID_STATUS_TRANSITION");
    Ok(())
}
