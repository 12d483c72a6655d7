use std::convert::Infallible;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, IntoResponseParts, Redirect, Response, ResponseParts},
};
use axum_extra::{TypedHeader, headers};
use http::header::SET_COOKIE;
use http::{HeaderMap, Method, StatusCode, request::Parts};
use jwt_user_storage::{JwtUserStorage, StorageConfig, UserIdentity};

use super::config::JWT_REDIRECT_ANON;

pub struct AuthRedirect {
    method: Method,
}

impl AuthRedirect {
    fn new(method: Method) -> Self {
        Self { method }
    }

    fn into_response_with_method(self) -> Response {
        if self.method == Method::GET {
            tracing::debug!("Redirecting to {}", JWT_REDIRECT_ANON.as_str());
            Redirect::temporary(JWT_REDIRECT_ANON.as_str()).into_response()
        } else {
            tracing::debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        self.into_response_with_method()
    }
}

async fn session_from_parts(parts: &mut Parts, config: Arc<StorageConfig>) -> JwtUserStorage {
    // A Cookie header that fails to parse counts as no cookie
    let cookies = parts
        .extract::<Option<TypedHeader<headers::Cookie>>>()
        .await
        .ok()
        .flatten()
        .map(|TypedHeader(cookies)| cookies);

    JwtUserStorage::new(config, &cookies, HeaderMap::new())
}

/// The request's session store, available as an Axum extractor
///
/// Reads go to the inbound cookie. Return the session from the handler, as
/// one of the response parts, to send the cookie written by its setters.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{response::Redirect, routing::post, Router};
/// use jwt_user_storage_axum::{IntoResponseError, JwtSession, StorageConfig, UserIdentity};
///
/// async fn login(mut session: JwtSession) -> Result<(JwtSession, Redirect), (http::StatusCode, String)> {
///     let identity = UserIdentity::new("u1", vec!["user".to_string()]);
///     session.set_identity(Some(&identity)).into_response_error()?;
///     session.set_authenticated(true).into_response_error()?;
///     Ok((session, Redirect::to("/")))
/// }
///
/// # fn app(config: Arc<StorageConfig>) -> Router {
/// Router::new().route("/login", post(login)).with_state(config)
/// # }
/// ```
pub struct JwtSession {
    storage: JwtUserStorage,
}

impl JwtSession {
    pub fn into_inner(self) -> JwtUserStorage {
        self.storage
    }
}

impl Deref for JwtSession {
    type Target = JwtUserStorage;

    fn deref(&self) -> &Self::Target {
        &self.storage
    }
}

impl DerefMut for JwtSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.storage
    }
}

impl<S> FromRequestParts<S> for JwtSession
where
    Arc<StorageConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<StorageConfig>::from_ref(state);
        let storage = session_from_parts(parts, config).await;
        Ok(Self { storage })
    }
}

impl IntoResponseParts for JwtSession {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let headers = self.storage.into_response();
        for value in headers.get_all(SET_COOKIE) {
            res.headers_mut().append(SET_COOKIE, value.clone());
        }
        Ok(res)
    }
}

/// Authenticated user, available as an Axum extractor
///
/// Admits only requests whose session is authenticated and carries an
/// identity. Anything else is rejected with a redirect to
/// [`JWT_REDIRECT_ANON`](crate::JWT_REDIRECT_ANON) for GET requests and
/// `401 Unauthorized` otherwise.
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{routing::get, Router};
/// use jwt_user_storage_axum::{AuthUser, StorageConfig};
///
/// async fn protected_handler(user: AuthUser) -> String {
///     format!("Hello, {}!", user.id)
/// }
///
/// # fn app(config: Arc<StorageConfig>) -> Router {
/// Router::new().route("/protected", get(protected_handler)).with_state(config)
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl From<UserIdentity> for AuthUser {
    fn from(identity: UserIdentity) -> Self {
        Self {
            id: identity.id,
            roles: identity.roles,
        }
    }
}

impl From<&AuthUser> for UserIdentity {
    fn from(user: &AuthUser) -> Self {
        UserIdentity::new(user.id.clone(), user.roles.clone())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<StorageConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let method = parts.method.clone();
        let config = Arc::<StorageConfig>::from_ref(state);
        let mut storage = session_from_parts(parts, config).await;

        let authenticated = storage.is_authenticated().map_err(|e| {
            tracing::warn!("Treating request with invalid session as anonymous: {e}");
            AuthRedirect::new(method.clone())
        })?;
        if !authenticated {
            tracing::debug!(
                "Session not authenticated: {:?}",
                storage.get_logout_reason().ok().flatten()
            );
            return Err(AuthRedirect::new(method));
        }

        let identity = storage
            .get_identity()
            .map_err(|_| AuthRedirect::new(method.clone()))?
            .ok_or_else(|| {
                tracing::debug!("Authenticated session carries no identity");
                AuthRedirect::new(method.clone())
            })?;

        Ok(AuthUser::from(identity))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    Arc<StorageConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let result: Result<Self, AuthRedirect> =
            <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await;
        Ok(result.ok())
    }
}
