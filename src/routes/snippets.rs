use axum::{
    extract::{Extension, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

use super::{auth_flag, base_data};
use crate::error::{AppError, AppResult};
use crate::forms;
use crate::middleware::IsAuthenticated;
use crate::session::{Session, KEY_FLASH};
use crate::state::AppState;
use crate::templates;

/// GET / — the ten latest unexpired snippets.
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    flag: Option<Extension<IsAuthenticated>>,
) -> AppResult<Html<String>> {
    let snippets = state.snippets.latest().await?;
    let data = base_data(&session, auth_flag(flag));
    Ok(Html(templates::home(&data, &snippets)))
}

/// GET /snippet/{id} — a single snippet, 404 when absent, expired or the id
/// is not a positive integer.
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    flag: Option<Extension<IsAuthenticated>>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id: i64 = id.parse().map_err(|_| AppError::NotFound)?;
    if id < 1 {
        return Err(AppError::NotFound);
    }
    let snippet = state.snippets.get(id).await?;
    let data = base_data(&session, auth_flag(flag));
    Ok(Html(templates::show(&data, &snippet)))
}

/// GET /snippet/create — empty creation form (auth required).
pub async fn create_form(
    Extension(session): Extension<Session>,
    flag: Option<Extension<IsAuthenticated>>,
) -> Html<String> {
    let data = base_data(&session, auth_flag(flag));
    Html(templates::create_form(&data, &forms::Form::default()))
}

/// POST /snippet/create — validate, insert, redirect to the new snippet.
/// Validation failures re-render the form with HTTP 200.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    flag: Option<Extension<IsAuthenticated>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let mut form = forms::Form::new(pairs);
    form.required(&["title", "content", "expires"]);
    form.max_length("title", 100);
    form.permitted_values("expires", &["365", "7", "1"]);

    if !form.valid() {
        let data = base_data(&session, auth_flag(flag));
        return Ok(Html(templates::create_form(&data, &form)).into_response());
    }

    let days: i64 = form
        .get("expires")
        .parse()
        .map_err(|_| AppError::BadRequest("expires is not a number".to_string()))?;
    let id = state.snippets.insert(form.get("title"), form.get("content"), days).await?;

    session.insert(KEY_FLASH, "Snippet successfully created!");
    Ok(Redirect::to(&format!("/snippet/{}", id)).into_response())
}
