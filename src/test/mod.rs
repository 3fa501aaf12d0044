use actix_web::{
    http::{header, StatusCode},
    test, web, App,
};
use serde_json::{json, Value};

use crate::{api_configure, sync::Synchronizer};

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Synchronizer::in_memory("test-secret")))
                .configure(api_configure),
        )
        .await
    };
}

macro_rules! sign_up_and_log_in {
    ($app:expr, $username:expr) => {{
        let credentials = json!({ "username": $username, "password": "password" });

        let req = test::TestRequest::post().uri("/api/users").set_json(&credentials).to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post().uri("/api/login").set_json(&credentials).to_request();
        let body: Value = test::call_and_read_body_json($app, req).await;
        body["data"]["access_token"].as_str().expect("token").to_owned()
    }};
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn friend_request_round_trip_over_http() {
    let app = app!();
    let alice = sign_up_and_log_in!(&app, "alice");
    let bob = sign_up_and_log_in!(&app, "bob");

    let req = test::TestRequest::post()
        .uri("/api/friend/requests/bob")
        .insert_header(bearer(&alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/friend/requests")
        .insert_header(bearer(&bob))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["from"], "alice");
    assert_eq!(body["data"][0]["to"], "bob");

    let req = test::TestRequest::put()
        .uri("/api/friend/accept/alice")
        .insert_header(bearer(&bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/friends")
        .insert_header(bearer(&alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!(["bob"]));
}

#[actix_web::test]
async fn domain_errors_carry_their_kind_and_status() {
    let app = app!();
    let alice = sign_up_and_log_in!(&app, "alice");
    let bob = sign_up_and_log_in!(&app, "bob");

    let req = test::TestRequest::post()
        .uri("/api/friend/requests/bob")
        .insert_header(bearer(&alice))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/friend/requests/alice")
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "DuplicateRequestError");

    let req = test::TestRequest::post()
        .uri("/api/friend/requests/alice")
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "SelfReferenceError");

    let req = test::TestRequest::put()
        .uri("/api/friend/accept/ghost")
        .insert_header(bearer(&bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn public_routes_skip_authentication() {
    let app = app!();
    sign_up_and_log_in!(&app, "alice");

    let req = test::TestRequest::get().uri("/api/users/alice").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["username"], "alice");

    let req = test::TestRequest::get().uri("/api/badges?author=alice").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn authenticated_routes_require_a_valid_token() {
    let app = app!();

    let req = test::TestRequest::get().uri("/api/friends").to_request();
    let status = match test::try_call_service(&app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/friends")
        .insert_header(bearer("not-a-token"))
        .to_request();
    let status = match test::try_call_service(&app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn posts_are_public_to_read_and_guarded_to_edit() {
    let app = app!();
    let alice = sign_up_and_log_in!(&app, "alice");
    let bob = sign_up_and_log_in!(&app, "bob");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .set_json(json!({ "content": "hello", "options": { "backgroundColor": "teal" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let id = body["data"]["id"].as_str().expect("post id").to_owned();

    let req = test::TestRequest::get().uri("/api/posts?author=alice").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["author"], "alice");
    assert_eq!(body["data"][0]["content"], "hello");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&bob))
        .set_json(json!({ "content": "mine now" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NotAllowedError");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn logged_out_tokens_are_rejected() {
    let app = app!();
    let alice = sign_up_and_log_in!(&app, "alice");

    let req = test::TestRequest::post()
        .uri("/api/logout")
        .insert_header(bearer(&alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/session")
        .insert_header(bearer(&alice))
        .to_request();
    let status = match test::try_call_service(&app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::FORBIDDEN);
}
