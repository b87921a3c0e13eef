//! HTML rendering.
//!
//! Rendering is a pure function from (page, data) to a response body; nothing
//! here touches the request pipeline. Pages share one base layout carrying the
//! navigation, the popped flash message and the CSRF token for forms.

use crate::forms::Form;
use crate::models::Snippet;
use chrono::{TimeZone, Utc};

/// Data every page receives in addition to its own payload.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
}

fn escape(s: &str) -> String {
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

fn format_ts(epoch_secs: i64) -> String {
    match Utc.timestamp_opt(epoch_secs, 0).single() {
        Some(dt) => dt.format("%d %b %Y at %H:%M").to_string(),
        None => String::new(),
    }
}

fn base(title: &str, data: &TemplateData, main: &str) -> String {
    let nav = if data.is_authenticated {
        format!(
            r#"<a href="/snippet/create">Create snippet</a><form action="/user/logout" method="POST" class="logout">{}<button>Logout</button></form>"#,
            csrf_field(&data.csrf_token)
        )
    } else {
        r#"<a href="/user/signup">Signup</a><a href="/user/login">Login</a>"#.to_string()
    };

    let flash = match &data.flash {
        Some(msg) => format!(r#"<div class="flash">{}</div>"#, escape(msg)),
        None => String::new(),
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title} - Zettelbox</title>
  <link rel="stylesheet" href="/static/main.css">
</head>
<body>
  <header><h1><a href="/">Zettelbox</a></h1></header>
  <nav><a href="/">Home</a>{nav}</nav>
  {flash}
  <main>{main}</main>
  <footer>&copy; {year} Zettelbox</footer>
</body>
</html>
"#,
        title = escape(title),
        nav = nav,
        flash = flash,
        main = main,
        year = data.current_year,
    )
}

fn csrf_field(token: &str) -> String {
    format!(r#"<input type="hidden" name="csrf_token" value="{}">"#, escape(token))
}

fn field_error(form: &Form, field: &str) -> String {
    let msg = form.errors.get(field);
    if msg.is_empty() {
        String::new()
    } else {
        format!(r#"<label class="error">{}</label>"#, escape(msg))
    }
}

pub fn home(data: &TemplateData, snippets: &[Snippet]) -> String {
    let main = if snippets.is_empty() {
        "<h2>Latest Snippets</h2><p>There's nothing to see here... yet!</p>".to_string()
    } else {
        let rows: String = snippets
            .iter()
            .map(|s| {
                format!(
                    r#"<tr><td><a href="/snippet/{id}">{title}</a></td><td>{created}</td><td>#{id}</td></tr>"#,
                    id = s.id,
                    title = escape(&s.title),
                    created = format_ts(s.created),
                )
            })
            .collect();
        format!(
            "<h2>Latest Snippets</h2><table><tr><th>Title</th><th>Created</th><th>ID</th></tr>{}</table>",
            rows
        )
    };
    base("Home", data, &main)
}

pub fn show(data: &TemplateData, snippet: &Snippet) -> String {
    let main = format!(
        r#"<div class="snippet">
  <div class="metadata"><strong>{title}</strong><span>#{id}</span></div>
  <pre><code>{content}</code></pre>
  <div class="metadata"><time>Created: {created}</time><time>Expires: {expires}</time></div>
</div>"#,
        title = escape(&snippet.title),
        id = snippet.id,
        content = escape(&snippet.content),
        created = format_ts(snippet.created),
        expires = format_ts(snippet.expires),
    );
    base(&snippet.title, data, &main)
}

pub fn create_form(data: &TemplateData, form: &Form) -> String {
    let main = format!(
        r#"<form action="/snippet/create" method="POST">
  {csrf}
  <div>
    <label>Title:</label>
    {title_err}
    <input type="text" name="title" value="{title}">
  </div>
  <div>
    <label>Content:</label>
    {content_err}
    <textarea name="content">{content}</textarea>
  </div>
  <div>
    <label>Delete in:</label>
    {expires_err}
    <input type="radio" name="expires" value="365" {y}> One Year
    <input type="radio" name="expires" value="7" {w}> One Week
    <input type="radio" name="expires" value="1" {d}> One Day
  </div>
  <div><input type="submit" value="Publish snippet"></div>
</form>"#,
        csrf = csrf_field(&data.csrf_token),
        title_err = field_error(form, "title"),
        title = escape(form.get("title")),
        content_err = field_error(form, "content"),
        content = escape(form.get("content")),
        expires_err = field_error(form, "expires"),
        y = if form.get("expires") == "365" { "checked" } else { "" },
        w = if form.get("expires") == "7" || form.get("expires").is_empty() { "checked" } else { "" },
        d = if form.get("expires") == "1" { "checked" } else { "" },
    );
    base("Create a New Snippet", data, &main)
}

pub fn signup(data: &TemplateData, form: &Form) -> String {
    let main = format!(
        r#"<form action="/user/signup" method="POST" novalidate>
  {csrf}
  <div>
    <label>Name:</label>
    {name_err}
    <input type="text" name="name" value="{name}">
  </div>
  <div>
    <label>Email:</label>
    {email_err}
    <input type="email" name="email" value="{email}">
  </div>
  <div>
    <label>Password:</label>
    {password_err}
    <input type="password" name="password">
  </div>
  <div><input type="submit" value="Signup"></div>
</form>"#,
        csrf = csrf_field(&data.csrf_token),
        name_err = field_error(form, "name"),
        name = escape(form.get("name")),
        email_err = field_error(form, "email"),
        email = escape(form.get("email")),
        password_err = field_error(form, "password"),
    );
    base("Signup", data, &main)
}

pub fn login(data: &TemplateData, form: &Form) -> String {
    let generic = form.errors.get("generic");
    let generic_err = if generic.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="error">{}</div>"#, escape(generic))
    };
    let main = format!(
        r#"<form action="/user/login" method="POST" novalidate>
  {csrf}
  {generic_err}
  <div>
    <label>Email:</label>
    {email_err}
    <input type="email" name="email" value="{email}">
  </div>
  <div>
    <label>Password:</label>
    {password_err}
    <input type="password" name="password">
  </div>
  <div><input type="submit" value="Login"></div>
</form>"#,
        csrf = csrf_field(&data.csrf_token),
        generic_err = generic_err,
        email_err = field_error(form, "email"),
        email = escape(form.get("email")),
        password_err = field_error(form, "password"),
    );
    base("Login", data, &main)
}
