//! Embedded UI pages.
//!
//! Both pages are compiled into the binary. The login page carries two
//! placeholders filled in at render time; user-controlled values are
//! HTML-escaped before substitution.

use htmlescape::{encode_attribute, encode_minimal};

const LOGIN_PAGE: &str = include_str!("login.html");

pub const INDEX_PAGE: &str = include_str!("index.html");

/// Renders the login page with an optional error banner and the hidden
/// redirect target for the form.
pub fn render_login_page(error: Option<&str>, next: &str) -> String {
    let error_block = match error {
        Some(message) => format!(r#"<div class="error">{}</div>"#, encode_minimal(message)),
        None => String::new(),
    };

    LOGIN_PAGE
        .replace("{{error}}", &error_block)
        .replace("{{next}}", &encode_attribute(next))
}
