use serde_json::{json, Value};

mod common;
use common::utils::{body_json, spawn_app, TestApp};

async fn create_match(test_app: &TestApp, token: &str, body: Value) -> Value {
    let response = test_app.post("/api/matches/create", token, body).await;
    assert_eq!(response.status().as_u16(), 201);
    body_json(response).await["data"].clone()
}

fn five_a_side(players: Value) -> Value {
    json!({
        "date": "2024-05-04",
        "time": "18:00",
        "location": "Hackney Marshes",
        "format": "F5",
        "players": players
    })
}

#[tokio::test]
async fn match_is_validated_once_every_player_confirms_or_skips() {
    let test_app = spawn_app().await;
    let u1 = test_app.register_user("u1", "user_one").await;
    let u2 = test_app.register_user("u2", "user_two").await;

    let created = create_match(
        &test_app,
        &u1,
        five_a_side(json!([
            { "user_id": "u1", "team": "A", "goals": 2, "assists": 1 },
            { "user_id": "u2", "team": "B", "goals": 1 }
        ])),
    )
    .await;
    let match_id = created["match_id"].as_str().unwrap().to_string();
    assert_eq!(created["score"], json!({ "teamA": 2, "teamB": 1 }));
    assert_eq!(created["is_validated"], false);
    assert_eq!(created["creator_username"], "user_one");
    assert_eq!(created["players"][1]["username"], "user_two");

    let pending = body_json(test_app.get("/api/matches/pending-validation", &u2).await).await;
    assert_eq!(pending["data"].as_array().unwrap().len(), 1);

    let validated = test_app
        .post(&format!("/api/matches/{}/validate", match_id), &u1, json!({}))
        .await;
    assert_eq!(validated.status().as_u16(), 200);
    assert_eq!(body_json(validated).await["data"]["is_validated"], false);

    let skipped = test_app
        .post(&format!("/api/matches/{}/skip-validation", match_id), &u2, json!({}))
        .await;
    assert_eq!(skipped.status().as_u16(), 200);
    let skipped = body_json(skipped).await;
    assert_eq!(skipped["data"]["is_validated"], true);
    assert_eq!(skipped["data"]["validations"][1]["skipped"], true);

    let pending = body_json(test_app.get("/api/matches/pending-validation", &u2).await).await;
    assert!(pending["data"].as_array().unwrap().is_empty());

    let fetched = body_json(test_app.get(&format!("/api/matches/{}", match_id), &u2).await).await;
    assert_eq!(fetched["data"]["is_validated"], true);
}

#[tokio::test]
async fn validation_errors_map_to_http_statuses() {
    let test_app = spawn_app().await;
    let u1 = test_app.register_user("u1", "user_one").await;
    let outsider = test_app.register_user("u9", "outsider").await;

    let created = create_match(
        &test_app,
        &u1,
        five_a_side(json!([{ "user_id": "u1", "team": "A" }])),
    )
    .await;
    let match_id = created["match_id"].as_str().unwrap().to_string();

    let not_participant = test_app
        .post(&format!("/api/matches/{}/validate", match_id), &outsider, json!({}))
        .await;
    assert_eq!(not_participant.status().as_u16(), 403);
    assert_eq!(body_json(not_participant).await["success"], false);

    test_app
        .post(&format!("/api/matches/{}/validate", match_id), &u1, json!({}))
        .await;
    let twice = test_app
        .post(&format!("/api/matches/{}/skip-validation", match_id), &u1, json!({}))
        .await;
    assert_eq!(twice.status().as_u16(), 400);

    let unknown = test_app
        .get(&format!("/api/matches/{}", uuid::Uuid::new_v4()), &u1)
        .await;
    assert_eq!(unknown.status().as_u16(), 404);
}

#[tokio::test]
async fn create_rejects_invalid_player_lines() {
    let test_app = spawn_app().await;
    let u1 = test_app.register_user("u1", "user_one").await;

    let cases = [
        json!([{ "user_id": "u1", "team": "C" }]),
        json!([{ "user_id": "u1", "team": "A", "goals": -1 }]),
        json!([{ "user_id": "u1", "team": "A" }, { "user_id": "u1", "team": "B" }]),
        json!([
            { "user_id": "u1", "team": "A", "goals": 3_000_000_000i64 },
            { "user_id": "u2", "team": "A", "goals": 3_000_000_000i64 }
        ]),
    ];
    for players in cases {
        let response = test_app
            .post("/api/matches/create", &u1, five_a_side(players.clone()))
            .await;
        assert_eq!(response.status().as_u16(), 400, "players {} were accepted", players);
    }

    let mut no_location = five_a_side(json!([]));
    no_location["location"] = json!("  ");
    let response = test_app.post("/api/matches/create", &u1, no_location).await;
    assert_eq!(response.status().as_u16(), 400);

    let mine = body_json(test_app.get("/api/matches/my-matches", &u1).await).await;
    assert!(mine["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn joining_a_match_counts_as_validation() {
    let test_app = spawn_app().await;
    let u1 = test_app.register_user("u1", "user_one").await;
    let u2 = test_app.register_user("u2", "user_two").await;

    let created = create_match(
        &test_app,
        &u1,
        five_a_side(json!([{ "user_id": "u1", "team": "A", "goals": 1 }])),
    )
    .await;
    let match_id = created["match_id"].as_str().unwrap().to_string();
    test_app
        .post(&format!("/api/matches/{}/validate", match_id), &u1, json!({}))
        .await;

    let joined = test_app
        .post(
            &format!("/api/matches/{}/players", match_id),
            &u2,
            json!({ "team": "B", "goals": 3 }),
        )
        .await;
    assert_eq!(joined.status().as_u16(), 200);
    let joined = body_json(joined).await;
    assert_eq!(joined["data"]["score"], json!({ "teamA": 1, "teamB": 3 }));
    assert_eq!(joined["data"]["is_validated"], true);

    let again = test_app
        .post(&format!("/api/matches/{}/players", match_id), &u2, json!({}))
        .await;
    assert_eq!(again.status().as_u16(), 400);

    let mine = body_json(test_app.get("/api/matches/my-matches", &u2).await).await;
    assert_eq!(mine["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn my_matches_lists_newest_first_and_includes_created_only() {
    let test_app = spawn_app().await;
    let u1 = test_app.register_user("u1", "user_one").await;
    test_app.register_user("u2", "user_two").await;

    let mut older = five_a_side(json!([{ "user_id": "u1", "team": "A" }]));
    older["date"] = json!("2023-09-01");
    create_match(&test_app, &u1, older).await;
    // created by u1 without u1 on the pitch
    create_match(
        &test_app,
        &u1,
        five_a_side(json!([{ "user_id": "u2", "team": "B" }])),
    )
    .await;

    let mine = body_json(test_app.get("/api/matches/my-matches", &u1).await).await;
    let mine = mine["data"].as_array().unwrap().clone();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0]["date"], "2024-05-04");
    assert_eq!(mine[1]["date"], "2023-09-01");
}
