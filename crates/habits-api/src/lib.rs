pub mod auth;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod pages;
pub mod report;
pub mod repository;
pub mod routes;
pub mod state;

mod rows;

use axum::{
    Router,
    middleware::from_fn_with_state,
    response::Redirect,
    routing::{get, post},
};

pub use error::AppError;
pub use state::{AppState, AppStateInner};

/// Builds the full application router. Everything outside the public group
/// sits behind the session gate.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(|| async { Redirect::to("/habits") }))
        .route("/health", get(|| async { "ok" }))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout));

    let protected_routes = Router::new()
        .route("/habits", get(routes::list_habits))
        .route("/habits/add", get(routes::habit_form).post(routes::add_habit))
        .route("/habits/delete", post(routes::delete_habit))
        .route("/records/mark", post(routes::mark_record))
        .route("/report", get(routes::report))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
