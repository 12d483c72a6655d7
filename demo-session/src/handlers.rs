use axum::{
    Form, Json,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use chrono::Duration;
use serde::Deserialize;
use serde_json::json;

use jwt_user_storage::{ExpirationFlags, ExpirationTime};
use jwt_user_storage_axum::{AuthUser, IntoResponseError, JwtSession, UserIdentity};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    user_id: String,
    #[serde(default)]
    roles: String,
    /// Checkbox; absent when unticked
    remember: Option<String>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub(crate) async fn index(user: Option<AuthUser>) -> Html<String> {
    let body = match user {
        Some(user) => format!(
            r#"<p>Hello, {}! Roles: {}</p>
<form method="post" action="/logout"><button>Log out</button></form>
<form method="post" action="/forget"><button>Forget me</button></form>
<p><a href="/protected">Protected page</a> | <a href="/session">Session claims</a></p>"#,
            escape(&user.id),
            escape(&user.roles.join(", "))
        ),
        None => r#"<p>Hello, anonymous user</p>
<form method="post" action="/login">
  <input name="user_id" placeholder="user id" required>
  <input name="roles" placeholder="roles, comma separated">
  <label><input type="checkbox" name="remember" value="on"> Remember me</label>
  <button>Log in</button>
</form>
<p><a href="/session">Session claims</a></p>"#
            .to_string(),
    };
    Html(body)
}

pub(crate) async fn login(
    mut session: JwtSession,
    Form(form): Form<LoginForm>,
) -> Result<(JwtSession, Redirect), (StatusCode, String)> {
    let roles = form
        .roles
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    let identity = UserIdentity::new(form.user_id, roles);

    session.set_identity(Some(&identity)).into_response_error()?;
    session.set_authenticated(true).into_response_error()?;

    // Without "remember me" the cookie dies with the browser, and the token
    // 30 minutes after login whatever the activity
    let (time, flags) = match form.remember {
        Some(_) => (
            ExpirationTime::After(Duration::days(14)),
            ExpirationFlags::NONE,
        ),
        None => (
            ExpirationTime::After(Duration::minutes(30)),
            ExpirationFlags::BROWSER_CLOSED,
        ),
    };
    session.set_expiration(Some(time), flags).into_response_error()?;

    tracing::info!("User {} logged in", identity.id);
    Ok((session, Redirect::to("/")))
}

pub(crate) async fn logout(
    mut session: JwtSession,
) -> Result<(JwtSession, Redirect), (StatusCode, String)> {
    session.set_authenticated(false).into_response_error()?;
    Ok((session, Redirect::to("/")))
}

/// Drops the identity along with the authentication
pub(crate) async fn forget(
    mut session: JwtSession,
) -> Result<(JwtSession, Redirect), (StatusCode, String)> {
    session.set_identity(None).into_response_error()?;
    Ok((session, Redirect::to("/")))
}

pub(crate) async fn protected(user: AuthUser) -> impl IntoResponse {
    if user.has_role("admin") {
        format!("Welcome, administrator {}", user.id)
    } else {
        format!("Welcome, {}", user.id)
    }
}

pub(crate) async fn session_info(
    mut session: JwtSession,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let authenticated = session.is_authenticated().into_response_error()?;
    let reason = session
        .get_logout_reason()
        .into_response_error()?
        .map(|r| r.to_string());
    let claims = session.claims().into_response_error()?.clone();

    Ok(Json(json!({
        "authenticated": authenticated,
        "logout_reason": reason,
        "claims": claims,
    })))
}
