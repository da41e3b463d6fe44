//! OAuth login proxy.
//!
//! A thin pass-through to an external identity provider: `/login` redirects
//! to the provider's authorize URL, `/callback` exchanges the code for a
//! token server-to-server and stores it in the session map, `/userinfo`
//! forwards the stored bearer token and returns the provider JSON verbatim.
//! Nothing here inspects the token.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use arigato_core::AppError;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::error::HttpAppError;
use crate::state::AuthState;

const SESSION_COOKIE: &str = "arigato_session";

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Extract the session id from the Cookie header, if any.
fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

#[tracing::instrument(skip(auth), fields(operation = "login"))]
pub async fn login(State(auth): State<AuthState>) -> Result<impl IntoResponse, HttpAppError> {
    let oauth = auth.oauth()?;

    let url = format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
        oauth.authorize_url,
        encode(&oauth.client_id),
        encode(&oauth.redirect_uri),
        encode(&oauth.scope),
    );

    Ok(Redirect::temporary(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

#[tracing::instrument(skip(state, query), fields(operation = "oauth_callback"))]
pub async fn callback(
    State(state): State<std::sync::Arc<crate::state::AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, HttpAppError> {
    let auth = &state.auth;
    let oauth = auth.oauth()?;

    let code = query
        .code
        .ok_or_else(|| AppError::InvalidInput("Missing authorization code".to_string()))?;

    let token_response = auth
        .http
        .post(&oauth.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
            ("redirect_uri", oauth.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("Token exchange request failed: {}", e)))?;

    if !token_response.status().is_success() {
        return Err(AppError::Unauthorized(format!(
            "Token endpoint returned {}",
            token_response.status()
        ))
        .into());
    }

    let payload: serde_json::Value = token_response
        .json()
        .await
        .map_err(|e| AppError::Internal(format!("Invalid token response: {}", e)))?;

    let access_token = payload
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            AppError::Unauthorized("Token response did not contain an access token".to_string())
        })?;

    let session_id = auth.sessions.insert(access_token.to_string()).await;
    tracing::info!("OAuth login completed");

    let cookie = format!("{}={}; HttpOnly; Path=/", SESSION_COOKIE, session_id);
    let mut response = Redirect::to(&state.config.frontend_url).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))?,
    );

    Ok(response)
}

#[tracing::instrument(skip(auth, headers), fields(operation = "userinfo"))]
pub async fn userinfo(
    State(auth): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpAppError> {
    let oauth = auth.oauth()?;

    let session_id = session_id_from_headers(&headers)
        .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?;
    let token = auth
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| AppError::Unauthorized("Session expired".to_string()))?;

    let provider_response = auth
        .http
        .get(&oauth.userinfo_url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("User info request failed: {}", e)))?;

    if !provider_response.status().is_success() {
        return Err(AppError::Unauthorized(format!(
            "User info endpoint returned {}",
            provider_response.status()
        ))
        .into());
    }

    let payload: serde_json::Value = provider_response
        .json()
        .await
        .map_err(|e| AppError::Internal(format!("Invalid user info response: {}", e)))?;

    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_parsed_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; arigato_session=abc-123; theme=dark"),
        );
        assert_eq!(
            session_id_from_headers(&headers).as_deref(),
            Some("abc-123")
        );
    }

    #[test]
    fn missing_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert!(session_id_from_headers(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("other=1"));
        assert!(session_id_from_headers(&headers).is_none());
    }

    #[test]
    fn query_encoding_escapes_reserved_characters() {
        assert_eq!(encode("openid profile"), "openid%20profile");
        assert_eq!(
            encode("http://localhost:5000/callback"),
            "http%3A%2F%2Flocalhost%3A5000%2Fcallback"
        );
    }
}
