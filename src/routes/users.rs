use axum::{
    extract::{Extension, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

use super::{auth_flag, base_data};
use crate::error::{AppError, AppResult};
use crate::forms::{self, EMAIL_RX};
use crate::middleware::IsAuthenticated;
use crate::session::{Session, KEY_AUTH_USER_ID, KEY_FLASH};
use crate::state::AppState;
use crate::templates;

/// GET /user/signup
pub async fn signup_form(
    Extension(session): Extension<Session>,
    flag: Option<Extension<IsAuthenticated>>,
) -> Html<String> {
    let data = base_data(&session, auth_flag(flag));
    Html(templates::signup(&data, &forms::Form::default()))
}

/// POST /user/signup — validate, create the account, redirect to login.
/// A duplicate email surfaces as a field-level message, not a generic error.
pub async fn signup_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    flag: Option<Extension<IsAuthenticated>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let mut form = forms::Form::new(pairs);
    form.required(&["name", "email", "password"]);
    form.max_length("email", 255);
    form.matches_pattern("email", &EMAIL_RX);
    form.min_length("password", 10);

    if !form.valid() {
        let data = base_data(&session, auth_flag(flag));
        return Ok(Html(templates::signup(&data, &form)).into_response());
    }

    match state.users.insert(form.get("name"), form.get("email"), form.get("password")).await {
        Ok(()) => {
            session.insert(KEY_FLASH, "Your signup was successful. Please log in.");
            Ok(Redirect::to("/user/login").into_response())
        }
        Err(AppError::DuplicateEmail) => {
            form.errors.add("email", "Address is already in use");
            let data = base_data(&session, auth_flag(flag));
            Ok(Html(templates::signup(&data, &form)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// GET /user/login
pub async fn login_form(
    Extension(session): Extension<Session>,
    flag: Option<Extension<IsAuthenticated>>,
) -> Html<String> {
    let data = base_data(&session, auth_flag(flag));
    Html(templates::login(&data, &forms::Form::default()))
}

/// POST /user/login — verify credentials and write the identity claim into
/// the session. Bad credentials re-render the form with a generic message.
pub async fn login_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    flag: Option<Extension<IsAuthenticated>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let mut form = forms::Form::new(pairs);
    form.required(&["email", "password"]);

    if !form.valid() {
        let data = base_data(&session, auth_flag(flag));
        return Ok(Html(templates::login(&data, &form)).into_response());
    }

    match state.users.authenticate(form.get("email"), form.get("password")).await {
        Ok(user_id) => {
            session.insert(KEY_AUTH_USER_ID, user_id);
            Ok(Redirect::to("/snippet/create").into_response())
        }
        Err(AppError::InvalidCredentials) => {
            form.errors.add("generic", "Email or Password is incorrect");
            let data = base_data(&session, auth_flag(flag));
            Ok(Html(templates::login(&data, &form)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// POST /user/logout — drop the identity claim and go home (auth required).
pub async fn logout_post(Extension(session): Extension<Session>) -> Redirect {
    session.remove(KEY_AUTH_USER_ID);
    session.insert(KEY_FLASH, "You've been logged out successfully!");
    Redirect::to("/")
}
