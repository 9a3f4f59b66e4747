//! Minimal server-rendered HTML. Every interpolated value goes through
//! [`escape`].

use std::fmt::Write;

use axum::http::StatusCode;
use axum::response::Html;
use chrono::NaiveDate;

use habits_types::models::{AdviceMessage, HabitOverview, HabitReport};
use habits_types::period::Period;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} · Habit Tracker</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

fn nav() -> &'static str {
    "<nav><a href=\"/habits\">Habits</a> | <a href=\"/habits/add\">Add habit</a> | \
     <a href=\"/report?period=week\">Report</a>\
     <form method=\"post\" action=\"/logout\" style=\"display:inline\"><button>Log out</button></form></nav>"
}

pub fn register_page() -> Html<String> {
    layout(
        "Register",
        "<h1>Create an account</h1>\n\
         <form id=\"register\" method=\"post\" action=\"/register\">\n\
         <label>Username <input name=\"username\" required minlength=\"3\" maxlength=\"32\"></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required minlength=\"6\"></label>\n\
         <button>Register</button>\n</form>\n\
         <p>Already registered? <a href=\"/login\">Log in</a></p>",
    )
}

pub fn login_page() -> Html<String> {
    layout(
        "Log in",
        "<h1>Log in</h1>\n\
         <form id=\"login\" method=\"post\" action=\"/login\">\n\
         <label>Username <input name=\"username\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <button>Log in</button>\n</form>\n\
         <p>No account? <a href=\"/register\">Register</a></p>",
    )
}

pub fn habits_page(username: &str, habits: &[HabitOverview], today: NaiveDate) -> Html<String> {
    let mut body = format!("{}\n<h1>{}'s habits</h1>\n", nav(), escape(username));

    if habits.is_empty() {
        body.push_str("<p>No habits yet. <a href=\"/habits/add\">Add one</a>.</p>\n");
    } else {
        body.push_str("<table id=\"habits\">\n<tr><th>Habit</th><th>Days/week</th><th>Target</th><th>Today</th><th></th></tr>\n");
        for item in habits {
            let h = &item.habit;
            let (label, next) = if item.done_today { ("Undo", "false") } else { ("Done", "true") };
            let _ = write!(
                body,
                "<tr><td>{desc}</td><td>{freq}</td><td>{target}%</td>\
                 <td><form method=\"post\" action=\"/records/mark\">\
                 <input type=\"hidden\" name=\"habit_id\" value=\"{id}\">\
                 <input type=\"hidden\" name=\"date\" value=\"{today}\">\
                 <input type=\"hidden\" name=\"done\" value=\"{next}\">\
                 <button>{label}</button></form></td>\
                 <td><form method=\"post\" action=\"/habits/delete\">\
                 <input type=\"hidden\" name=\"habit_id\" value=\"{id}\">\
                 <button>Delete</button></form></td></tr>\n",
                desc = escape(&h.description),
                freq = h.frequency,
                target = h.target_percent,
                id = h.id,
            );
        }
        body.push_str("</table>\n");
    }

    layout("Habits", &body)
}

pub fn habit_form_page() -> Html<String> {
    let body = format!(
        "{}\n<h1>New habit</h1>\n\
         <form id=\"habit_form\" method=\"post\" action=\"/habits/add\">\n\
         <label>Description <input name=\"description\" required maxlength=\"200\"></label>\n\
         <label>Days per week <input name=\"frequency\" type=\"number\" min=\"1\" max=\"7\" value=\"7\"></label>\n\
         <label>Target % <input name=\"target_percent\" type=\"number\" min=\"0\" max=\"100\" value=\"80\"></label>\n\
         <button>Add</button>\n</form>",
        nav()
    );
    layout("Add habit", &body)
}

pub fn report_page(period: Period, reports: &[HabitReport], advice: Option<&AdviceMessage>) -> Html<String> {
    let mut body = format!("{}\n<h1>Adherence report: last {}</h1>\n<p>", nav(), period);
    for p in Period::ALL {
        let _ = write!(body, "<a href=\"/report?period={p}\">{p}</a> ");
    }
    body.push_str("</p>\n");

    if reports.is_empty() {
        body.push_str("<p>No habits to report on.</p>\n");
    } else {
        body.push_str("<table id=\"report\">\n<tr><th>Habit</th><th>Done</th><th>Expected</th><th>Adherence</th><th>Target</th><th>Status</th></tr>\n");
        for r in reports {
            let status = if r.on_track { "on track" } else { "behind" };
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}%</td><td>{}%</td><td class=\"status\">{}</td></tr>",
                escape(&r.habit.description),
                r.completed_days,
                r.expected_days,
                r.adherence_percent,
                r.habit.target_percent,
                status,
            );
        }
        body.push_str("</table>\n");
    }

    if let Some(advice) = advice {
        let _ = writeln!(body, "<blockquote class=\"advice\">{}</blockquote>", escape(&advice.message));
    }

    layout("Report", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let body = format!(
        "<h1>{}</h1>\n<p class=\"error\">{}</p>\n<p><a href=\"/habits\">Back</a></p>",
        status.as_u16(),
        escape(message)
    );
    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn error_page_escapes_message() {
        let Html(html) = error_page(StatusCode::BAD_REQUEST, "<script>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
