use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;

use crate::csrf;

pub const SESSION_COOKIE: &str = "csrf_session";

/// Per-client id that CSRF tokens are signed over. Taken from the
/// `csrf_session` cookie, or freshly generated when the client sent none.
#[derive(Debug, Clone)]
pub struct CsrfSession {
    id: String,
    is_new: bool,
}

// Достаем значение cookie из заголовков Cookie
fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

impl<S: Send + Sync> FromRequestParts<S> for CsrfSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match session_from_headers(&parts.headers) {
            Some(id) => CsrfSession { id, is_new: false },
            None => CsrfSession { id: csrf::new_session_id(), is_new: true },
        })
    }
}

impl CsrfSession {
    /// Id to issue tokens for.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id the client actually presented. A freshly generated id never
    /// verifies a submission.
    pub fn existing(&self) -> Option<&str> {
        if self.is_new {
            None
        } else {
            Some(&self.id)
        }
    }

    pub fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id)
    }

    /// Adds `Set-Cookie` to the response when the session was created by this request.
    pub fn attach(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.is_new {
            if let Ok(value) = HeaderValue::from_str(&self.cookie()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}
