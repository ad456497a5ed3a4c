//! Server-rendered HTML for the dashboard shell and the auth forms.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

use super::auth::{Flash, login_url};

fn flash_list(flashes: &[Flash]) -> String {
    let mut out = String::new();
    for flash in flashes {
        let _ = write!(
            out,
            r#"<div class="flash flash-{}">{}</div>"#,
            encode_double_quoted_attribute(&flash.category),
            encode_text(&flash.message)
        );
    }
    out
}

fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Laptop Dashboard</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<main class="container">
{flashes}
{body}
</main>
</body>
</html>"#,
        title = encode_text(title),
        flashes = flash_list(flashes),
    )
}

#[must_use]
pub fn login(flashes: &[Flash], next: Option<&str>) -> String {
    let action = login_url(next);

    let body = format!(
        r#"<section class="card auth">
<h1>Sign in</h1>
<form method="post" action="{action}">
<label>Username <input name="username" required autofocus></label>
<label>Password <input name="password" type="password" required></label>
<label class="inline"><input name="remember_me" type="checkbox"> Remember me</label>
<button type="submit">Sign in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>
</section>"#,
        action = encode_double_quoted_attribute(&action),
    );
    layout("Sign in", flashes, &body)
}

#[must_use]
pub fn register(flashes: &[Flash]) -> String {
    let body = r#"<section class="card auth">
<h1>Create an account</h1>
<form method="post" action="/register">
<label>Username <input name="username" minlength="3" maxlength="20" required></label>
<label>Email <input name="email" type="email" required></label>
<label>Password <input name="password" type="password" minlength="6" required></label>
<label>Confirm password <input name="password2" type="password" required></label>
<button type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Sign in</a></p>
</section>"#;
    layout("Register", flashes, body)
}

/// Aggregate panels filled in by `dashboard.js` from the JSON endpoints.
const PANELS: [(&str, &str); 11] = [
    ("overview", "Overview"),
    ("brand", "Brands"),
    ("ram", "Memory"),
    ("cpu", "Processors"),
    ("price-range", "Price ranges"),
    ("sales", "Best sellers"),
    ("correlation", "Price vs. sales"),
    ("clustering", "Market segments"),
    ("competitive", "Competitors"),
    ("trend", "Price forecast"),
    ("sentiment", "Review sentiment"),
];

const FILTERS: &str = r#"<form id="analysis-filters" class="card filters">
<label>Brand <select id="filter-brand"><option value="">All brands</option></select></label>
<label>Memory <select id="filter-ram"><option value="">Any</option></select></label>
<label>Forecast days <input id="filter-days" type="number" min="1" value="30"></label>
<button type="submit">Analyze</button>
</form>"#;

#[must_use]
pub fn dashboard(username: &str, flashes: &[Flash]) -> String {
    let mut panels = String::new();
    for (id, title) in PANELS {
        let _ = write!(
            panels,
            r#"<section class="card panel"><h2>{title}</h2><div id="panel-{id}" class="panel-body">Loading…</div></section>"#
        );
    }

    let body = format!(
        r#"<header class="topbar">
<h1>Laptop Dashboard</h1>
<span class="user">Signed in as <strong>{user}</strong> · <a href="/logout">Sign out</a></span>
</header>
{FILTERS}
<div class="grid">
{panels}
</div>
<script src="/static/dashboard.js" defer></script>"#,
        user = encode_text(username),
    );
    layout("Dashboard", flashes, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashes_are_escaped() {
        let flashes = vec![Flash {
            category: "danger".to_string(),
            message: "<script>alert(1)</script>".to_string(),
        }];
        let html = login(&flashes, None);
        assert!(html.contains("flash-danger"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn test_dashboard_has_analysis_panels() {
        let html = dashboard("alice", &[]);
        for id in ["panel-competitive", "panel-trend", "panel-sentiment", "filter-brand", "filter-ram"] {
            assert!(html.contains(id), "missing {id}");
        }
    }

    #[test]
    fn test_login_form_keeps_next() {
        let html = login(&[], Some("/?tab=1"));
        assert!(html.contains(r#"action="/login?next=%2F%3Ftab%3D1""#));
    }

    #[test]
    fn test_dashboard_escapes_username() {
        let html = dashboard("<b>eve</b>", &[]);
        assert!(html.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(html.contains("panel-overview"));
    }
}
