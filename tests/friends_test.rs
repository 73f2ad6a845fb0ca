use serde_json::json;

mod common;
use common::utils::{body_json, spawn_app};

#[tokio::test]
async fn friend_request_accept_list_and_remove() {
    let test_app = spawn_app().await;
    let alice = test_app.register_user("alice-id", "alice").await;
    let bob = test_app.register_user("bob-id", "bob").await;

    let sent = test_app
        .post("/api/friends/request", &alice, json!({ "user_id": "bob-id" }))
        .await;
    assert_eq!(sent.status().as_u16(), 200);

    let received = body_json(test_app.get("/api/friends/requests/received", &bob).await).await;
    let received = received["data"].as_array().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["username"], "alice");
    assert_eq!(received[0]["is_pending_request"], true);

    let outgoing = body_json(test_app.get("/api/friends/requests/sent", &alice).await).await;
    assert_eq!(outgoing["data"][0]["auth_id"], "bob-id");

    let accepted = test_app
        .post("/api/friends/accept", &bob, json!({ "user_id": "alice-id" }))
        .await;
    assert_eq!(accepted.status().as_u16(), 200);

    for (token, friend) in [(&alice, "bob"), (&bob, "alice")] {
        let list = body_json(test_app.get("/api/friends/list", token).await).await;
        assert_eq!(list["data"][0]["username"], friend);
        assert_eq!(list["data"][0]["is_friend"], true);
    }

    let removed = test_app.delete("/api/friends/remove/bob-id", &alice).await;
    assert_eq!(removed.status().as_u16(), 200);
    let list = body_json(test_app.get("/api/friends/list", &bob).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());

    let again = test_app.delete("/api/friends/remove/bob-id", &alice).await;
    assert_eq!(again.status().as_u16(), 400);
}

#[tokio::test]
async fn friend_request_rejections() {
    let test_app = spawn_app().await;
    let alice = test_app.register_user("alice-id", "alice").await;
    let bob = test_app.register_user("bob-id", "bob").await;

    let to_self = test_app
        .post("/api/friends/request", &alice, json!({ "user_id": "alice-id" }))
        .await;
    assert_eq!(to_self.status().as_u16(), 400);

    let unknown = test_app
        .post("/api/friends/request", &alice, json!({ "user_id": "nobody" }))
        .await;
    assert_eq!(unknown.status().as_u16(), 404);

    test_app
        .post("/api/friends/request", &alice, json!({ "user_id": "bob-id" }))
        .await;
    let duplicate = test_app
        .post("/api/friends/request", &alice, json!({ "user_id": "bob-id" }))
        .await;
    assert_eq!(duplicate.status().as_u16(), 400);

    let reverse = test_app
        .post("/api/friends/request", &bob, json!({ "user_id": "alice-id" }))
        .await;
    assert_eq!(reverse.status().as_u16(), 400);

    let nothing_to_accept = test_app
        .post("/api/friends/accept", &alice, json!({ "user_id": "bob-id" }))
        .await;
    assert_eq!(nothing_to_accept.status().as_u16(), 400);
}

#[tokio::test]
async fn search_is_case_insensitive_prefix_and_excludes_caller() {
    let test_app = spawn_app().await;
    let alice = test_app.register_user("alice-id", "alice").await;
    test_app.register_user("albert-id", "Albert").await;
    test_app.register_user("carol-id", "carol").await;
    for i in 0..12 {
        test_app.register_user(&format!("al-{}", i), &format!("alfa{:02}", i)).await;
    }

    let found = body_json(test_app.get("/api/friends/search?query=AL", &alice).await).await;
    let found = found["data"].as_array().unwrap().clone();
    assert_eq!(found.len(), 10);
    assert!(found.iter().all(|u| u["auth_id"] != "alice-id"));
    assert!(found
        .iter()
        .all(|u| u["username"].as_str().unwrap().to_lowercase().starts_with("al")));

    let albert = body_json(test_app.get("/api/friends/search?query=alb", &alice).await).await;
    assert_eq!(albert["data"][0]["username"], "Albert");
    assert_eq!(albert["data"][0]["is_friend"], false);
}
