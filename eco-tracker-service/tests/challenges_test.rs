mod common;

use axum::http::StatusCode;
use common::{ids, titles, TestApp, TEST_USER};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

#[tokio::test]
async fn create_challenge_returns_insert_result() {
    let app = TestApp::spawn();

    let (status, body) = app
        .post(
            "/challenges",
            json!({
                "title": "Plastic-free week",
                "category": "Waste Reduction",
                "description": "No single-use plastic for seven days",
                "duration": 7,
                "target": "Zero plastic bags",
                "impactMetric": "kg plastic saved",
                "createdBy": TEST_USER,
                "participants": 999
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["acknowledged"], true);
    let id = body["insertedId"].as_str().expect("insertedId should be a string");

    let (status, challenge) = app.get(&format!("/challenges/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(challenge["_id"], id);
    assert_eq!(challenge["title"], "Plastic-free week");
    assert_eq!(challenge["impactMetric"], "kg plastic saved");
    assert_eq!(challenge["createdBy"], TEST_USER);
    // Server-owned fields ignore client input
    assert_eq!(challenge["participants"], 0);
    assert!(challenge["createdAt"].is_string());
}

#[tokio::test]
async fn create_challenge_rejects_malformed_json() {
    let app = TestApp::spawn();

    let response = app
        .request(
            axum::http::Request::builder()
                .method("POST")
                .uri("/challenges")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{\"title\": "))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_challenges_is_newest_first() {
    let app = TestApp::spawn();
    app.seed_challenge("Bike to work", "Transport", TEST_USER, 1_000)
        .await;
    app.seed_challenge("Meatless Mondays", "Food", TEST_USER, 3_000)
        .await;
    app.seed_challenge("Cold showers", "Energy", TEST_USER, 2_000)
        .await;

    let (status, body) = app.get("/challenges").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        titles(&body),
        vec!["Meatless Mondays", "Cold showers", "Bike to work"]
    );
}

#[tokio::test]
async fn list_challenges_filters_by_categories_and_search() {
    let app = TestApp::spawn();
    app.seed_challenge("Bike to work", "Transport", TEST_USER, 1_000)
        .await;
    app.seed_challenge("Bus week", "Transport", TEST_USER, 2_000)
        .await;
    app.seed_challenge("Meatless Mondays", "Food", TEST_USER, 3_000)
        .await;
    app.seed_challenge("Unplug at night", "Energy", TEST_USER, 4_000)
        .await;

    let (_, body) = app.get("/challenges?category=Transport,Food").await;
    assert_eq!(
        titles(&body),
        vec!["Meatless Mondays", "Bus week", "Bike to work"]
    );

    let (_, body) = app.get("/challenges?search=BIKE").await;
    assert_eq!(titles(&body), vec!["Bike to work"]);

    let (_, body) = app.get("/challenges?category=Transport&search=bus").await;
    assert_eq!(titles(&body), vec!["Bus week"]);

    let (_, body) = app.get("/challenges?category=Water").await;
    assert!(titles(&body).is_empty());
}

#[tokio::test]
async fn search_treats_regex_characters_literally() {
    let app = TestApp::spawn();
    app.seed_challenge("Bike (daily)", "Transport", TEST_USER, 1_000)
        .await;
    app.seed_challenge("Bike daily", "Transport", TEST_USER, 2_000)
        .await;

    let (status, body) = app.get("/challenges?search=(daily)").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Bike (daily)"]);
}

#[tokio::test]
async fn challenges_six_returns_the_six_newest() {
    let app = TestApp::spawn();
    for i in 0..8 {
        app.seed_challenge(&format!("Challenge {}", i), "Energy", TEST_USER, i * 1_000)
            .await;
    }

    let (status, body) = app.get("/challenges-six").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        titles(&body),
        vec![
            "Challenge 7",
            "Challenge 6",
            "Challenge 5",
            "Challenge 4",
            "Challenge 3",
            "Challenge 2"
        ]
    );
}

#[tokio::test]
async fn get_challenge_validates_id() {
    let app = TestApp::spawn();

    let (status, body) = app.get("/challenges/not-an-object-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = app
        .get(&format!("/challenges/{}", ObjectId::new().to_hex()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Challenge not found");
}

#[tokio::test]
async fn patch_challenge_updates_only_sent_fields() {
    let app = TestApp::spawn();
    let id = app
        .seed_challenge("Bike to work", "Transport", TEST_USER, 1_000)
        .await;

    let (status, body) = app
        .patch(
            &format!("/challenges/{}", id.to_hex()),
            json!({ "title": "Bike everywhere", "duration": 14 }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedCount"], 1);
    assert_eq!(body["modifiedCount"], 1);

    let (_, challenge) = app.get(&format!("/challenges/{}", id.to_hex())).await;
    assert_eq!(challenge["title"], "Bike everywhere");
    assert_eq!(challenge["duration"], 14);
    assert_eq!(challenge["category"], "Transport");
    assert_eq!(challenge["createdBy"], TEST_USER);
}

#[tokio::test]
async fn patch_challenge_with_same_values_modifies_nothing() {
    let app = TestApp::spawn();
    let id = app
        .seed_challenge("Bike to work", "Transport", TEST_USER, 1_000)
        .await;

    let (status, body) = app
        .patch(
            &format!("/challenges/{}", id.to_hex()),
            json!({ "title": "Bike to work" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedCount"], 1);
    assert_eq!(body["modifiedCount"], 0);
}

#[tokio::test]
async fn patch_challenge_rejects_empty_and_unknown_targets() {
    let app = TestApp::spawn();
    let id = app
        .seed_challenge("Bike to work", "Transport", TEST_USER, 1_000)
        .await;

    let (status, _) = app
        .patch(&format!("/challenges/{}", id.to_hex()), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .patch(
            &format!("/challenges/{}", ObjectId::new().to_hex()),
            json!({ "title": "Ghost" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .patch("/challenges/123", json!({ "title": "Ghost" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_challenge_removes_it() {
    let app = TestApp::spawn();
    let id = app
        .seed_challenge("Bike to work", "Transport", TEST_USER, 1_000)
        .await;

    let (status, body) = app.delete(&format!("/challenges/{}", id.to_hex())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (status, _) = app.get(&format!("/challenges/{}", id.to_hex())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/challenges/{}", id.to_hex())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_challenges_lists_only_the_creators() {
    let app = TestApp::spawn();
    let mine_old = app
        .seed_challenge("Bike to work", "Transport", TEST_USER, 1_000)
        .await;
    app.seed_challenge("Bus week", "Transport", "bo@example.com", 2_000)
        .await;
    let mine_new = app
        .seed_challenge("Meatless Mondays", "Food", TEST_USER, 3_000)
        .await;

    let (status, body) = app.get(&format!("/created-challenges/{}", TEST_USER)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![mine_new.to_hex(), mine_old.to_hex()]);

    let (_, body) = app.get("/created-challenges/nobody@example.com").await;
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn unlisted_fields_survive_create_and_fetch() {
    let app = TestApp::spawn();

    let (status, body) = app
        .post(
            "/challenges",
            json!({
                "title": "Bike to work",
                "target": 10,
                "creatorName": "Ana",
                "tags": ["commute", "health"],
                "participants": 50
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["insertedId"].as_str().unwrap();

    let (status, challenge) = app.get(&format!("/challenges/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(challenge["target"], 10);
    assert_eq!(challenge["creatorName"], "Ana");
    assert_eq!(challenge["tags"], json!(["commute", "health"]));
    assert_eq!(challenge["participants"], 0);

    let (_, list) = app.get("/challenges").await;
    assert_eq!(list[0]["creatorName"], "Ana");
}

#[tokio::test]
async fn target_accepts_text_or_numbers_on_patch() {
    let app = TestApp::spawn();
    let id = app
        .seed_challenge("Bike to work", "Transport", TEST_USER, 1_000)
        .await;
    let uri = format!("/challenges/{}", id.to_hex());

    let (status, _) = app.patch(&uri, json!({ "target": 25 })).await;
    assert_eq!(status, StatusCode::OK);
    let (_, challenge) = app.get(&uri).await;
    assert_eq!(challenge["target"], 25);

    let (status, _) = app.patch(&uri, json!({ "target": "25 km" })).await;
    assert_eq!(status, StatusCode::OK);
    let (_, challenge) = app.get(&uri).await;
    assert_eq!(challenge["target"], "25 km");
}
