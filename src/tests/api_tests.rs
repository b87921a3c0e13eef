//! End-to-end flows over the full router.

use axum::http::{header, StatusCode};

use super::common::{
    body_string, get, get_with_cookie, obtain_session, post_form, setup_app,
};

#[tokio::test]
async fn healthcheck_returns_ok() {
    let (app, _state, _guard) = setup_app().await;
    let res = get(&app, "/healthcheck").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "OK");
}

#[tokio::test]
async fn home_lists_latest_snippets() {
    let (app, state, _guard) = setup_app().await;
    state.snippets.insert("An old silent pond", "A frog jumps in", 7).await.unwrap();
    state.snippets.insert("Over the wintry forest", "winds howl in rage", 7).await.unwrap();

    let res = get(&app, "/").await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_string(res).await;
    assert!(html.contains("An old silent pond"));
    assert!(html.contains("Over the wintry forest"));
}

#[tokio::test]
async fn seeded_snippet_is_shown() {
    let (app, state, _guard) = setup_app().await;
    let id = state.snippets.insert("An old silent pond", "A frog jumps in", 7).await.unwrap();

    let res = get(&app, &format!("/snippet/{}", id)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_string(res).await;
    assert!(html.contains("An old silent pond"));
}

#[tokio::test]
async fn absent_snippet_is_404() {
    let (app, _state, _guard) = setup_app().await;
    let res = get(&app, "/snippet/9999999").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_snippet_id_is_404() {
    let (app, _state, _guard) = setup_app().await;
    let res = get(&app, "/snippet/abc").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signup_with_blank_password_rerenders_with_message() {
    let (app, _state, _guard) = setup_app().await;
    let (cookie, token) = obtain_session(&app, "/user/signup").await;

    let res = post_form(
        &app,
        "/user/signup",
        Some(&cookie),
        &[
            ("name", "Bob"),
            ("email", "bob@example.com"),
            ("password", ""),
            ("csrf_token", &token),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_string(res).await;
    assert!(html.contains("This field cannot be blank"));
}

#[tokio::test]
async fn signup_with_invalid_email_rerenders_with_message() {
    let (app, _state, _guard) = setup_app().await;
    let (cookie, token) = obtain_session(&app, "/user/signup").await;

    let res = post_form(
        &app,
        "/user/signup",
        Some(&cookie),
        &[
            ("name", "Bob"),
            ("email", "bob@"),
            ("password", "valid-password-123"),
            ("csrf_token", &token),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("This field is invalid"));
}

#[tokio::test]
async fn signup_duplicate_email_reports_field_error() {
    let (app, state, _guard) = setup_app().await;
    state.users.insert("Alice", "alice@example.com", "valid-password-123").await.unwrap();

    let (cookie, token) = obtain_session(&app, "/user/signup").await;
    let res = post_form(
        &app,
        "/user/signup",
        Some(&cookie),
        &[
            ("name", "Other Alice"),
            ("email", "alice@example.com"),
            ("password", "valid-password-123"),
            ("csrf_token", &token),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("Address is already in use"));
}

#[tokio::test]
async fn signup_redirects_to_login_and_flashes() {
    let (app, _state, _guard) = setup_app().await;
    let (cookie, token) = obtain_session(&app, "/user/signup").await;

    let res = post_form(
        &app,
        "/user/signup",
        Some(&cookie),
        &[
            ("name", "Bob"),
            ("email", "bob@example.com"),
            ("password", "valid-password-123"),
            ("csrf_token", &token),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/user/login");

    // The flash shows once and is gone afterwards
    let res = get_with_cookie(&app, "/user/login", &cookie).await;
    assert!(body_string(res).await.contains("Your signup was successful. Please log in."));
    let res = get_with_cookie(&app, "/user/login", &cookie).await;
    assert!(!body_string(res).await.contains("Your signup was successful. Please log in."));
}

#[tokio::test]
async fn login_with_bad_credentials_rerenders_with_generic_error() {
    let (app, state, _guard) = setup_app().await;
    state.users.insert("Alice", "alice@example.com", "valid-password-123").await.unwrap();

    let (cookie, token) = obtain_session(&app, "/user/login").await;
    let res = post_form(
        &app,
        "/user/login",
        Some(&cookie),
        &[
            ("email", "alice@example.com"),
            ("password", "wrong-password-!!"),
            ("csrf_token", &token),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("Email or Password is incorrect"));
}

#[tokio::test]
async fn csrf_mismatch_on_signup_is_400() {
    let (app, _state, _guard) = setup_app().await;
    let (cookie, _token) = obtain_session(&app, "/user/signup").await;

    let res = post_form(
        &app,
        "/user/signup",
        Some(&cookie),
        &[
            ("name", "Bob"),
            ("email", "bob@example.com"),
            ("password", "valid-password-123"),
            ("csrf_token", "forged-token"),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(res).await, "Bad Request");
}

/// Full lifecycle: login, create a snippet, view it, log out, lose access.
#[tokio::test]
async fn login_create_logout_flow() {
    let (app, state, _guard) = setup_app().await;
    state.users.insert("Alice", "alice@example.com", "valid-password-123").await.unwrap();

    // Anonymous access to the create form is bounced to login
    let res = get(&app, "/snippet/create").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/user/login");

    // Log in
    let (cookie, token) = obtain_session(&app, "/user/login").await;
    let res = post_form(
        &app,
        "/user/login",
        Some(&cookie),
        &[
            ("email", "alice@example.com"),
            ("password", "valid-password-123"),
            ("csrf_token", &token),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/snippet/create");

    // The create form is now reachable and uncacheable
    let res = get_with_cookie(&app, "/snippet/create", &cookie).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
    assert!(body_string(res).await.contains("Publish snippet"));

    // Publish a snippet
    let res = post_form(
        &app,
        "/snippet/create",
        Some(&cookie),
        &[
            ("title", "First haiku"),
            ("content", "An old silent pond..."),
            ("expires", "7"),
            ("csrf_token", &token),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res.headers().get(header::LOCATION).unwrap().to_str().unwrap().to_string();
    assert!(location.starts_with("/snippet/"));

    // The redirect target shows the snippet plus the creation flash
    let res = get_with_cookie(&app, &location, &cookie).await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_string(res).await;
    assert!(html.contains("First haiku"));
    assert!(html.contains("Snippet successfully created!"));

    // Validation failure re-renders with 200
    let res = post_form(
        &app,
        "/snippet/create",
        Some(&cookie),
        &[
            ("title", ""),
            ("content", "body"),
            ("expires", "14"),
            ("csrf_token", &token),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_string(res).await;
    assert!(html.contains("This field cannot be blank"));
    assert!(html.contains("This field is invalid"));

    // Log out
    let res = post_form(&app, "/user/logout", Some(&cookie), &[("csrf_token", &token)]).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/");

    // Back to being bounced
    let res = get_with_cookie(&app, "/snippet/create", &cookie).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/user/login");

    // Logout flash shows on the home page
    let res = get_with_cookie(&app, "/", &cookie).await;
    assert!(body_string(res).await.contains("You&#39;ve been logged out successfully!"));
}
