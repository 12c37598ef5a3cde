//! Minimal HTML pages of the portal.

#![expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]

use std::fmt::Write as _;

use axum::{
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
};
use service::{
    domain::{access, user::Role, User},
    query, Query as _,
};

use crate::{define_error, AsError, Context, Error};

/// Landing page, sending signed-in visitors to their [`Role`] home.
pub async fn landing(ctx: Context) -> Response {
    match ctx.session() {
        Some(s) if s.role.home() != "/" => {
            Redirect::temporary(s.role.home()).into_response()
        }
        Some(_) | None => render(
            "Claims portal",
            "<p>Submit and review claims of the distance-education \
             division.</p>\
             <p><a href=\"/login\">Sign in</a> or \
             <a href=\"/signup\">sign up</a>.</p>",
        )
        .into_response(),
    }
}

/// Sign-in form.
pub async fn login() -> Html<String> {
    render(
        "Sign in",
        "<form method=\"post\" action=\"/login\">\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Password \
         <input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Sign in</button>\
         </form>\
         <p>No account yet? <a href=\"/signup\">Sign up</a>.</p>",
    )
}

/// Sign-up form.
pub async fn signup() -> Html<String> {
    render(
        "Sign up",
        "<form method=\"post\" action=\"/signup\">\
         <label>Name <input type=\"text\" name=\"name\"></label>\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" \
         minlength=\"8\" maxlength=\"128\" required></label>\
         <button type=\"submit\">Sign up</button>\
         </form>\
         <p>Already registered? <a href=\"/login\">Sign in</a>.</p>",
    )
}

/// Dashboard of the [`Role`] owning the requested path.
///
/// # Errors
///
/// Errors if the visitor is not signed in.
pub async fn dashboard(ctx: Context, uri: Uri) -> Result<Html<String>, Error> {
    let session = ctx.current_session()?;
    let role = access::required_role(uri.path()).unwrap_or(session.role);

    let shown: &str = match &session.name {
        Some(name) => name.as_ref(),
        None => session.email.as_ref(),
    };
    let mut body = format!(
        "<p>Signed in as {} ({}).</p>",
        escape(shown),
        role_title(session.role),
    );
    if role != session.role {
        _ = write!(
            body,
            "<p>Viewing as {}.</p>",
            role_title(Role::Registry),
        );
    }
    body.push_str(NAV);

    Ok(render(&format!("{} dashboard", role_title(role)), &body))
}

/// Profile of the signed-in [`User`].
///
/// # Errors
///
/// Errors if:
/// - the visitor is not signed in;
/// - the [`User`] of the session does not exist anymore;
/// - the [`User`] cannot be read.
pub async fn profile(ctx: Context) -> Result<Html<String>, Error> {
    define_error! {
        enum ProfileError {
            #[code = "USER_NOT_EXISTS"]
            #[status = NOT_FOUND]
            #[message = "`User` of the session does not exist"]
            UserNotExists,
        }
    }

    let session = ctx.current_session()?;
    let User {
        name,
        email,
        role,
        created_at,
        ..
    } = ctx
        .service()
        .execute(query::user::ById::by(session.user_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(ProfileError::UserNotExists)?;

    let body = format!(
        "<dl>\
         <dt>Name</dt><dd>{}</dd>\
         <dt>Email</dt><dd>{}</dd>\
         <dt>Role</dt><dd>{}</dd>\
         <dt>Member since</dt><dd>{}</dd>\
         </dl>{NAV}",
        name.as_ref().map_or(String::new(), |n| escape(n.as_ref())),
        escape(email.as_ref()),
        role_title(role),
        created_at.to_rfc3339(),
    );

    Ok(render("Profile", &body))
}

/// Settings of the signed-in visitor.
///
/// # Errors
///
/// Errors if the visitor is not signed in.
pub async fn settings(ctx: Context) -> Result<Html<String>, Error> {
    let session = ctx.current_session()?;

    let body = format!(
        "<p>Signed in as {} ({}).</p>\
         <form method=\"post\" action=\"/logout\">\
         <button type=\"submit\">Sign out</button>\
         </form>{NAV}",
        escape(session.email.as_ref()),
        role_title(session.role),
    );

    Ok(render("Settings", &body))
}

/// Page explaining that access to the requested page is denied.
pub async fn unauthorized() -> (http::StatusCode, Html<String>) {
    (
        http::StatusCode::FORBIDDEN,
        render(
            "Access denied",
            "<p>Your role does not allow you to view this page.</p>\
             <p><a href=\"/\">Go home</a></p>",
        ),
    )
}

/// Fallback for paths not served by the portal.
pub async fn not_found() -> Error {
    define_error! {
        enum RouteError {
            #[code = "NOT_FOUND"]
            #[status = NOT_FOUND]
            #[message = "Page not found"]
            NotFound,
        }
    }

    RouteError::NotFound.into()
}

/// Navigation shared by the pages of signed-in visitors.
const NAV: &str = "<nav>\
                   <a href=\"/\">Home</a> \
                   <a href=\"/profile\">Profile</a> \
                   <a href=\"/settings\">Settings</a>\
                   </nav>";

/// Wraps the provided `body` markup into a complete HTML document.
fn render(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\
         <html lang=\"en\">\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1>{body}</body>\
         </html>",
    ))
}

/// Human-readable title of the provided [`Role`].
const fn role_title(role: Role) -> &'static str {
    match role {
        Role::Registry => "Registry",
        Role::Coordinator => "Coordinator",
        Role::Lecturer => "Lecturer",
        Role::StaffRegistry => "Staff registry",
    }
}

/// Escapes the provided `text` for embedding into HTML.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod spec {
    use super::escape;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape("<script>alert('x & y')</script>"),
            "&lt;script&gt;alert(&#39;x &amp; y&#39;)&lt;/script&gt;",
        );
        assert_eq!(escape("plain@unisa.ac.za"), "plain@unisa.ac.za");
    }
}
