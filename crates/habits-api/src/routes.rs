use axum::{
    Extension, Form,
    extract::{Query, State},
    response::{Html, Redirect},
};
use chrono::Utc;

use habits_types::api::{DeleteHabitForm, HabitForm, MarkRecordForm, ReportQuery};

use crate::error::AppError;
use crate::middleware::SessionUser;
use crate::pages;
use crate::report::parse_period;
use crate::repository::{NewHabit, parse_date, parse_done};
use crate::state::{AppState, run_blocking};

pub async fn list_habits(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> Result<Html<String>, AppError> {
    let today = Utc::now().date_naive();
    let habits = state.habits.clone();
    let owner = user.id;
    let overview = run_blocking(state.store_timeout, move || habits.overview(owner, today)).await?;

    Ok(pages::habits_page(&user.username, &overview, today))
}

pub async fn habit_form(Extension(_user): Extension<SessionUser>) -> Html<String> {
    pages::habit_form_page()
}

pub async fn add_habit(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<HabitForm>,
) -> Result<Redirect, AppError> {
    let new_habit = NewHabit::parse(&form)?;
    let habits = state.habits.clone();
    run_blocking(state.store_timeout, move || habits.create_habit(user.id, &new_habit)).await?;

    Ok(Redirect::to("/habits"))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<DeleteHabitForm>,
) -> Result<Redirect, AppError> {
    let habits = state.habits.clone();
    run_blocking(state.store_timeout, move || habits.delete_habit(user.id, &form.habit_id)).await?;

    Ok(Redirect::to("/habits"))
}

pub async fn mark_record(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<MarkRecordForm>,
) -> Result<Redirect, AppError> {
    let date = parse_date(&form.date)?;
    let done = parse_done(form.done.as_deref())?;
    let habits = state.habits.clone();
    run_blocking(state.store_timeout, move || {
        habits.mark_record(user.id, &form.habit_id, date, done)
    })
    .await?;

    Ok(Redirect::to("/habits"))
}

pub async fn report(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<ReportQuery>,
) -> Result<Html<String>, AppError> {
    let period = parse_period(query.period.as_deref())?;
    let today = Utc::now().date_naive();
    let reporter = state.reporter.clone();

    let (reports, advice) = run_blocking(state.store_timeout, move || {
        Ok((reporter.compute_report(user.id, period, today)?, reporter.advice()?))
    })
    .await?;

    Ok(pages::report_page(period, &reports, advice.as_ref()))
}
