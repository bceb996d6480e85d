mod common;

use common::TestApp;

#[tokio::test]
async fn zones_can_be_created_listed_updated_and_deleted() {
    let app = TestApp::spawn().await;

    let create = app
        .client
        .post(format!("{}/zones", app.address))
        .json(&serde_json::json!({
            "code": "Z-01",
            "location": "Main Street",
            "parking_rate": "Rs. 150 per hour",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(create.status().as_u16(), 201);

    let zone: serde_json::Value = create.json().await.expect("Invalid zone body");
    assert_eq!(zone["display_name"], "Z-01 - Main Street");
    let id = zone["id"].as_str().unwrap().to_string();

    let listed: serde_json::Value = app
        .client
        .get(format!("{}/zones", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Invalid list body");
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let update = app
        .client
        .put(format!("{}/zones/{}", app.address, id))
        .json(&serde_json::json!({
            "code": "Z-01",
            "location": "Main Street",
            "parking_rate": "Rs. 200 per hour",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(update.status().is_success());
    let updated: serde_json::Value = update.json().await.expect("Invalid zone body");
    assert_eq!(updated["parking_rate"], "Rs. 200 per hour");

    let delete = app
        .client
        .delete(format!("{}/zones/{}", app.address, id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(delete.status().as_u16(), 204);

    let listed: serde_json::Value = app
        .client
        .get(format!("{}/zones", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Invalid list body");
    assert!(listed.as_array().unwrap().is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn duplicate_zone_code_is_rejected() {
    let app = TestApp::spawn().await;
    app.seed_zone("Z-01", "Main Street", "Rs. 100 per hour").await;

    let response = app
        .client
        .post(format!("{}/zones", app.address))
        .json(&serde_json::json!({
            "code": "Z-01",
            "location": "Somewhere Else",
            "parking_rate": "Rs. 120 per hour",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 409);

    app.cleanup().await;
}

#[tokio::test]
async fn updating_a_missing_zone_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .put(format!(
            "{}/zones/00000000-0000-0000-0000-000000000000",
            app.address
        ))
        .json(&serde_json::json!({
            "code": "Z-09",
            "location": "Ghost Street",
            "parking_rate": "Rs. 100 per hour",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn rate_resolution_falls_back_from_location_to_code() {
    let app = TestApp::spawn().await;
    app.seed_zone("Z-05", "Harbour View", "Rs. 175 per hour").await;

    // Display string whose location part does not match any zone, but whose
    // code part does.
    let ticket = app
        .create_ticket("WP CAB-4321", "Z-05 - Renamed Since", "1 hour")
        .await;
    assert_eq!(ticket["parking_rate"], 175);

    app.cleanup().await;
}
