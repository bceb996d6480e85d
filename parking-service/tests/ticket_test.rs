mod common;

use common::{TestApp, TestSettings, TEST_VEHICLE};

#[tokio::test]
async fn create_ticket_prices_duration_at_zone_rate() {
    let app = TestApp::spawn().await;
    let zone = app.seed_zone("Z-01", "Main Street", "Rs. 150 per hour").await;

    let ticket = app
        .create_ticket(TEST_VEHICLE, &zone, "1 hour 30 minutes")
        .await;

    // 1.5 hours at 150/hr
    assert_eq!(ticket["parking_fee"], 225);
    assert_eq!(ticket["parking_rate"], 150);
    assert_eq!(ticket["status"], "ACTIVE");
    assert_eq!(ticket["vehicle_number"], TEST_VEHICLE);
    assert_eq!(ticket["can_cancel"], true);

    // 90 minutes on the clock, minus at most a few seconds of test time.
    let remaining = ticket["time_remaining"].as_i64().unwrap();
    assert!(remaining > 89 * 60 && remaining <= 90 * 60, "{}", remaining);

    let ticket_no = ticket["ticket_no"].as_str().unwrap();
    assert!(ticket_no.starts_with("PK-"));

    app.cleanup().await;
}

#[tokio::test]
async fn create_ticket_normalizes_vehicle_number() {
    let app = TestApp::spawn().await;
    let zone = app.seed_zone("Z-01", "Main Street", "Rs. 100 per hour").await;

    let ticket = app.create_ticket(" wp abc-1234 ", &zone, "1 hour").await;
    assert_eq!(ticket["vehicle_number"], "WP ABC-1234");

    app.cleanup().await;
}

#[tokio::test]
async fn create_ticket_in_unknown_zone_uses_default_rate() {
    let app = TestApp::spawn().await;

    let ticket = app
        .create_ticket(TEST_VEHICLE, "Z-99 - Nowhere", "1 hour")
        .await;

    assert_eq!(ticket["parking_rate"], 100);
    assert_eq!(ticket["parking_fee"], 100);

    app.cleanup().await;
}

#[tokio::test]
async fn create_ticket_with_digitless_rate_text_uses_default_rate() {
    let app = TestApp::spawn().await;
    let zone = app.seed_zone("Z-02", "Market Square", "free for now").await;

    let ticket = app.create_ticket(TEST_VEHICLE, &zone, "1 hour").await;
    assert_eq!(ticket["parking_rate"], 100);

    app.cleanup().await;
}

#[tokio::test]
async fn create_ticket_without_vehicle_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/tickets", app.address))
        .json(&serde_json::json!({
            "vehicle_number": "",
            "zone": "Z-01 - Main Street",
            "duration_text": "1 hour",
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 422);

    app.cleanup().await;
}

#[tokio::test]
async fn extend_adds_fee_and_time_at_the_stored_rate() {
    let app = TestApp::spawn().await;
    let zone = app.seed_zone("Z-01", "Main Street", "Rs. 150 per hour").await;

    let ticket = app
        .create_ticket(TEST_VEHICLE, &zone, "1 hour 30 minutes")
        .await;
    let id = ticket["id"].as_str().unwrap();
    let end_before = ticket["end_time"].as_str().unwrap().to_string();

    let response = app
        .client
        .post(format!("{}/tickets/{}/extend", app.address, id))
        .json(&serde_json::json!({ "duration_text": "30 minutes" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let extended: serde_json::Value = response.json().await.expect("Invalid ticket body");
    // 225 + round(0.5 * 150)
    assert_eq!(extended["parking_fee"], 300);
    assert_eq!(extended["extensions"], 1);
    assert!(extended["end_time"].as_str().unwrap() > end_before.as_str());

    app.cleanup().await;
}

#[tokio::test]
async fn extend_past_the_cap_is_rejected() {
    let app = TestApp::spawn_with(TestSettings {
        max_extensions: Some(1),
        ..Default::default()
    })
    .await;
    let zone = app.seed_zone("Z-01", "Main Street", "Rs. 100 per hour").await;

    let ticket = app.create_ticket(TEST_VEHICLE, &zone, "1 hour").await;
    let id = ticket["id"].as_str().unwrap();

    let first = app
        .client
        .post(format!("{}/tickets/{}/extend", app.address, id))
        .json(&serde_json::json!({ "duration_text": "30 minutes" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(first.status().is_success());

    let second = app
        .client
        .post(format!("{}/tickets/{}/extend", app.address, id))
        .json(&serde_json::json!({ "duration_text": "30 minutes" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second.status().as_u16(), 409);

    app.cleanup().await;
}

#[tokio::test]
async fn get_unknown_ticket_returns_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!(
            "{}/tickets/00000000-0000-0000-0000-000000000000",
            app.address
        ))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn list_tickets_filters_active_ones() {
    let app = TestApp::spawn().await;
    let zone = app.seed_zone("Z-01", "Main Street", "Rs. 100 per hour").await;

    let ticket = app.create_ticket(TEST_VEHICLE, &zone, "1 hour").await;
    let id = ticket["id"].as_str().unwrap();

    // Cancel it, then create a fresh one.
    let response = app
        .client
        .post(format!("{}/tickets/{}/cancel", app.address, id))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let fresh = app.create_ticket(TEST_VEHICLE, &zone, "1 hour").await;

    let all: serde_json::Value = app
        .client
        .get(format!("{}/tickets?vehicle={}", app.address, "WP%20ABC-1234"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Invalid list body");
    assert_eq!(all.as_array().unwrap().len(), 2);

    let active: serde_json::Value = app
        .client
        .get(format!(
            "{}/tickets?vehicle={}&active=true",
            app.address, "WP%20ABC-1234"
        ))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Invalid list body");
    let active = active.as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], fresh["id"]);

    app.cleanup().await;
}
