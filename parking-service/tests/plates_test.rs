mod common;

use common::{TestApp, TestSettings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn recognized_plate_text_is_normalized() {
    let ocr = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/recognize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": " wp  abc-1234 ",
            "confidence": 0.93,
        })))
        .mount(&ocr)
        .await;

    let app = TestApp::spawn_with(TestSettings {
        ocr_url: Some(format!("{}/v1", ocr.uri())),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(format!("{}/plates/recognize", app.address))
        .json(&serde_json::json!({ "image_base64": "aGVsbG8=" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Invalid plate body");
    assert_eq!(body["vehicle_number"], "WP ABC-1234");
    assert_eq!(body["confidence"], 0.93);

    app.cleanup().await;
}

#[tokio::test]
async fn ocr_failure_surfaces_as_bad_gateway() {
    let ocr = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/recognize"))
        .respond_with(ResponseTemplate::new(500).set_body_string("ocr backend down"))
        .mount(&ocr)
        .await;

    let app = TestApp::spawn_with(TestSettings {
        ocr_url: Some(format!("{}/v1", ocr.uri())),
        ..Default::default()
    })
    .await;

    let response = app
        .client
        .post(format!("{}/plates/recognize", app.address))
        .json(&serde_json::json!({ "image_base64": "aGVsbG8=" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 502);

    app.cleanup().await;
}

#[tokio::test]
async fn empty_image_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/plates/recognize", app.address))
        .json(&serde_json::json!({ "image_base64": "" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 422);

    app.cleanup().await;
}
