mod common;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::StatusCode, rt, test, App, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::TcpListener;
use todoforge::models::Task;
use todoforge::routes;
use uuid::Uuid;

use common::{bearer, memory_state, register_and_login};

#[actix_rt::test]
async fn test_create_todo_unauthorized_over_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let state = memory_state();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(routes::configure(state.clone()))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/todos", port))
        .json(&json!({"title": "sneaky"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("body is json");
    assert_eq!(body["error"], "Authorization header required");

    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn test_owner_scenario() {
    let app = test::init_service(App::new().configure(routes::configure(memory_state()))).await;

    let alice = register_and_login(&app, "alice@example.com", "secret1").await;
    let bob = register_and_login(&app, "bob@example.com", "secret2").await;

    // Create
    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(bearer(&alice.token))
        .set_json(json!({"title": "buy milk"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.title, "buy milk");
    assert!(!created.completed);
    assert_eq!(created.user_id, alice.user_id);

    // List
    let req = test::TestRequest::get()
        .uri("/todos")
        .append_header(bearer(&alice.token))
        .to_request();
    let listed: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    // Bob cannot delete it, and learns nothing about its existence.
    let req = test::TestRequest::delete()
        .uri(&format!("/todos/{}", created.id))
        .append_header(bearer(&bob.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let foreign_body = test::read_body(resp).await;

    let req = test::TestRequest::get()
        .uri(&format!("/todos/{}", Uuid::new_v4()))
        .append_header(bearer(&bob.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(test::read_body(resp).await, foreign_body);

    // Alice deletes it.
    let req = test::TestRequest::delete()
        .uri(&format!("/todos/{}", created.id))
        .append_header(bearer(&alice.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Value = test::read_body_json(resp).await;
    assert_eq!(deleted["id"], json!(created.id));

    // And it is gone.
    let req = test::TestRequest::get()
        .uri(&format!("/todos/{}", created.id))
        .append_header(bearer(&alice.token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_foreign_tasks_are_invisible() {
    let app = test::init_service(App::new().configure(routes::configure(memory_state()))).await;

    let alice = register_and_login(&app, "alice@example.com", "secret1").await;
    let bob = register_and_login(&app, "bob@example.com", "secret2").await;

    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(bearer(&alice.token))
        .set_json(json!({"title": "alice only", "completed": true}))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;
    assert!(task.completed);

    let uri = format!("/todos/{}", task.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .append_header(bearer(&bob.token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::put()
        .uri(&uri)
        .append_header(bearer(&bob.token))
        .set_json(json!({"title": "hijacked"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get()
        .uri("/todos")
        .append_header(bearer(&bob.token))
        .to_request();
    let bobs: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(bobs.is_empty());

    // Alice's task is untouched.
    let req = test::TestRequest::get()
        .uri(&uri)
        .append_header(bearer(&alice.token))
        .to_request();
    let fetched: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched.title, "alice only");
    assert_eq!(fetched.user_id, alice.user_id);
}

#[actix_rt::test]
async fn test_body_cannot_choose_the_owner() {
    let app = test::init_service(App::new().configure(routes::configure(memory_state()))).await;

    let alice = register_and_login(&app, "alice@example.com", "secret1").await;
    let bob = register_and_login(&app, "bob@example.com", "secret2").await;

    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(bearer(&alice.token))
        .set_json(json!({"title": "mine", "user_id": bob.user_id}))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(task.user_id, alice.user_id);
}

#[actix_rt::test]
async fn test_update_rules() {
    let app = test::init_service(App::new().configure(routes::configure(memory_state()))).await;
    let alice = register_and_login(&app, "alice@example.com", "secret1").await;

    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(bearer(&alice.token))
        .set_json(json!({"title": "write report"}))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/todos/{}", task.id);

    // Completed-only patch keeps the title.
    let req = test::TestRequest::put()
        .uri(&uri)
        .append_header(bearer(&alice.token))
        .set_json(json!({"completed": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = test::read_body_json(resp).await;
    assert_eq!(updated.title, "write report");
    assert!(updated.completed);
    assert!(updated.updated_at >= task.updated_at);
    assert_eq!(updated.created_at, task.created_at);

    // Empty patch, blank title and overlong title are rejected.
    for body in [
        json!({}),
        json!({"title": "   "}),
        json!({"title": "x".repeat(201)}),
    ] {
        let req = test::TestRequest::put()
            .uri(&uri)
            .append_header(bearer(&alice.token))
            .set_json(body.clone())
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST,
            "patch {} was accepted",
            body
        );
    }

    let req = test::TestRequest::get()
        .uri(&uri)
        .append_header(bearer(&alice.token))
        .to_request();
    let fetched: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched.title, "write report");
    assert!(fetched.completed);
}

#[actix_rt::test]
async fn test_bad_input_is_rejected() {
    let app = test::init_service(App::new().configure(routes::configure(memory_state()))).await;
    let alice = register_and_login(&app, "alice@example.com", "secret1").await;

    let req = test::TestRequest::get()
        .uri("/todos/not-a-uuid")
        .append_header(bearer(&alice.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid id");

    for payload in [json!({"title": ""}), json!({"completed": true})] {
        let req = test::TestRequest::post()
            .uri("/todos")
            .append_header(bearer(&alice.token))
            .set_json(payload)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }
}

#[actix_rt::test]
async fn test_list_is_newest_first() {
    let app = test::init_service(App::new().configure(routes::configure(memory_state()))).await;
    let alice = register_and_login(&app, "alice@example.com", "secret1").await;

    let req = test::TestRequest::get()
        .uri("/todos")
        .append_header(bearer(&alice.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "[]");

    for title in ["first", "second", "third"] {
        let req = test::TestRequest::post()
            .uri("/todos")
            .append_header(bearer(&alice.token))
            .set_json(json!({ "title": title }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::get()
        .uri("/todos")
        .append_header(bearer(&alice.token))
        .to_request();
    let listed: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<&str> = listed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}
