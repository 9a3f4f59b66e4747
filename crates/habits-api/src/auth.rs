use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use habits_types::api::{LoginForm, RegisterForm};

use crate::error::AppError;
use crate::middleware::removal_cookie;
use crate::pages;
use crate::state::{AppState, run_blocking};

pub async fn register_page() -> Html<String> {
    pages::register_page()
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    let credentials = state.credentials.clone();
    run_blocking(state.store_timeout, move || {
        credentials.register(&form.username, &form.password)
    })
    .await?;

    Ok(Redirect::to("/login"))
}

pub async fn login_page() -> Html<String> {
    pages::login_page()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let attempted = form.username.clone();
    let credentials = state.credentials.clone();
    let user = run_blocking(state.store_timeout, move || {
        credentials.authenticate(&form.username, &form.password)
    })
    .await
    .inspect_err(|e| {
        if matches!(e, AppError::Authentication) {
            warn!("Rejected login for '{}'", attempted);
        }
    })?;

    let token = state.session.issue(&user)?;
    info!("User {} logged in", user.id);

    Ok((jar.add(state.session.cookie(token)), Redirect::to("/habits")))
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(removal_cookie()), Redirect::to("/login"))
}
