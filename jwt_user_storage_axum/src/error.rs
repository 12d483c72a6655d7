use http::StatusCode;
use jwt_user_storage::SessionError;

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// A rejected token means the client must authenticate again; everything
/// else is a server fault.
impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match e {
                SessionError::Token(_) => StatusCode::UNAUTHORIZED,
                SessionError::Cookie(_)
                | SessionError::Serialization(_)
                | SessionError::Utils(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string())
        })
    }
}
