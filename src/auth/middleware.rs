//! Guards the ledger routes behind a session for the shared credential.
//!
//! A request gets through when its auth cookie holds an unexpired token for the
//! username of the configured credential. Each request that gets through
//! slides the session forward by [DEFAULT_COOKIE_DURATION], so the ledger stays
//! open while it is being used and closes soon after it is left alone.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::UtcOffset;

use crate::{
    AppState, Error,
    auth::{
        CredentialProvider, DEFAULT_COOKIE_DURATION,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed to check ledger sessions.
#[derive(Clone)]
pub struct AuthState {
    /// The key used to decrypt the auth cookie.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Karachi".
    pub local_timezone: String,
    /// The credential a session must belong to.
    pub credentials: Arc<dyn CredentialProvider>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            credentials: state.credentials.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// A session that was accepted for the current request.
struct Session {
    jar: PrivateCookieJar,
    local_offset: UtcOffset,
}

/// Why a request was sent to the log-in page.
#[derive(Debug)]
enum Rejection {
    /// Cookie expiry cannot be worked out without a valid timezone.
    InvalidTimezone(String),
    /// The auth cookie is missing, unreadable or expired.
    NoSession(Error),
    /// The session was opened for a username the credential no longer has.
    ForeignUsername(String),
}

impl Rejection {
    fn log(&self) {
        match self {
            Rejection::InvalidTimezone(timezone) => {
                tracing::error!("Cannot check sessions with invalid timezone {timezone:?}.")
            }
            Rejection::NoSession(error) => tracing::debug!("No session: {error}."),
            Rejection::ForeignUsername(username) => tracing::info!(
                "Ended session for {username:?}, which no longer matches the shared credential."
            ),
        }
    }
}

async fn open_session(state: &AuthState, parts: &mut Parts) -> Result<Session, Rejection> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Rejection::InvalidTimezone(state.local_timezone.clone()))?;

    let jar = match PrivateCookieJar::from_request_parts(parts, state).await {
        Ok(jar) => jar,
        Err(error) => match error {},
    };

    let token = get_token_from_cookies(&jar).map_err(Rejection::NoSession)?;

    if !state.credentials.owns_session(&token.username) {
        return Err(Rejection::ForeignUsername(token.username));
    }

    tracing::trace!("Request made in the session of {:?}", token.username);

    Ok(Session { jar, local_offset })
}

/// Copy the refreshed auth cookie onto `response`.
///
/// If the cookie cannot be refreshed the response is sent unchanged and the
/// session ends when the current cookie expires.
fn slide_session(session: Session, response: Response) -> Response {
    let (mut parts, body) = response.into_parts();

    match extend_auth_cookie_duration_if_needed(
        session.jar,
        DEFAULT_COOKIE_DURATION,
        session.local_offset,
    ) {
        Ok(jar) => {
            for value in jar.into_response().headers().get_all(SET_COOKIE) {
                parts.headers.append(SET_COOKIE, value.to_owned());
            }
        }
        Err(error) => tracing::error!("Could not extend the session: {error}"),
    }

    Response::from_parts(parts, body)
}

/// The log-in URL that sends the user back to what they were doing.
fn log_in_redirect_url(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        tracing::debug!(
            "No safe page to return to from {}, returning to the ledger after log-in.",
            request.uri()
        );

        build_log_in_redirect_url_from_target(endpoints::LEDGER_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

async fn guard(
    state: AuthState,
    request: Request,
    next: Next,
    redirect: impl FnOnce(String) -> Response,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let session = open_session(&state, &mut parts).await;
    let request = Request::from_parts(parts, body);

    match session {
        Ok(session) => {
            let response = next.run(request).await;
            slide_session(session, response)
        }
        Err(rejection) => {
            rejection.log();
            redirect(log_in_redirect_url(&request))
        }
    }
}

/// Middleware that lets a request through only when it belongs to a session
/// for the shared credential. Other requests are redirected to the log-in page.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, |redirect_url| {
        Redirect::to(&redirect_url).into_response()
    })
    .await
}

/// Same as [auth_guard], but redirects with `HX-Redirect` since the ledger's
/// forms and delete buttons are submitted by HTMX.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url), StatusCode::OK).into_response()
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        extract::Query,
        middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, SameSite},
    };
    use axum_test::{TestResponse, TestServer};
    use serde::Deserialize;
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        app_state::create_cookie_key,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, SharedCredential, auth_guard, auth_guard_hx,
            set_auth_cookie,
        },
        endpoints,
    };

    use super::AuthState;

    const LEDGER_ROUTE: &str = "/ledger/report";
    const DELETE_ROUTE: &str = "/api/transactions/1";
    const TEST_LOG_IN_ROUTE: &str = "/test/log_in";

    #[derive(Deserialize)]
    struct TestLogIn {
        username: String,
        seconds: i64,
    }

    /// Open a session without checking a password.
    async fn test_log_in(
        Query(log_in): Query<TestLogIn>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(
            jar,
            &log_in.username,
            Duration::seconds(log_in.seconds),
            UtcOffset::UTC,
        )
    }

    fn get_test_server() -> TestServer {
        let state = AuthState {
            cookie_key: create_cookie_key("nafstenoas"),
            local_timezone: "Etc/UTC".to_owned(),
            credentials: Arc::new(SharedCredential::new("admin", "hunter2", 4).unwrap()),
        };

        let app = Router::new()
            .route(LEDGER_ROUTE, get(|| async { "ledger" }))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .merge(
                Router::new()
                    .route(DELETE_ROUTE, post(|| async { "deleted" }))
                    .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
            )
            .route(TEST_LOG_IN_ROUTE, post(test_log_in))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    async fn log_in_as(server: &TestServer, username: &str, duration: Duration) -> Cookie<'static> {
        let response = server
            .post(TEST_LOG_IN_ROUTE)
            .add_query_param("username", username)
            .add_query_param("seconds", duration.whole_seconds())
            .await;

        response.assert_status_ok();
        response.cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn session_for_shared_username_gets_through() {
        let server = get_test_server();
        let cookie = log_in_as(&server, "admin", DEFAULT_COOKIE_DURATION).await;

        let response = server.get(LEDGER_ROUTE).add_cookie(cookie).await;

        response.assert_status_ok();
        response.assert_text("ledger");
    }

    #[tokio::test]
    async fn session_slides_forward_on_each_request() {
        let server = get_test_server();
        let cookie = log_in_as(&server, "admin", Duration::seconds(5)).await;

        let response = server.get(LEDGER_ROUTE).add_cookie(cookie).await;

        let cookie = response.cookie(COOKIE_TOKEN);
        let want_expiry = OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION;
        let got_expiry = cookie.expires_datetime().unwrap();
        assert!(
            (got_expiry - want_expiry).abs() < Duration::seconds(2),
            "got expiry {got_expiry}, want {want_expiry}"
        );
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn request_without_session_goes_to_log_in() {
        let server = get_test_server();

        let response = server.get(LEDGER_ROUTE).await;

        assert_redirects_to_log_in(&response);
    }

    #[tokio::test]
    async fn unreadable_cookie_goes_to_log_in() {
        let server = get_test_server();

        let response = server
            .get(LEDGER_ROUTE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;

        assert_redirects_to_log_in(&response);
    }

    #[tokio::test]
    async fn expired_session_goes_to_log_in() {
        let server = get_test_server();
        let cookie = log_in_as(&server, "admin", Duration::seconds(-1)).await;

        let response = server.get(LEDGER_ROUTE).add_cookie(cookie).await;

        assert_redirects_to_log_in(&response);
    }

    #[tokio::test]
    async fn session_for_another_username_goes_to_log_in() {
        let server = get_test_server();
        let cookie = log_in_as(&server, "former-admin", DEFAULT_COOKIE_DURATION).await;

        let response = server.get(LEDGER_ROUTE).add_cookie(cookie).await;

        assert_redirects_to_log_in(&response);
    }

    #[tokio::test]
    async fn htmx_request_returns_to_current_ledger_view() {
        let server = get_test_server();
        let current_url = "/ledger?month=8&year=2025";

        let response = server
            .post(DELETE_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("hx-redirect"), log_in_url(current_url));
    }

    #[tokio::test]
    async fn api_request_without_htmx_headers_returns_to_ledger() {
        let server = get_test_server();

        let response = server.post(DELETE_ROUTE).await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect"),
            log_in_url(endpoints::LEDGER_VIEW)
        );
    }

    fn log_in_url(redirect_url: &str) -> String {
        let query = serde_urlencoded::to_string([("redirect_url", redirect_url)]).unwrap();

        format!("{}?{}", endpoints::LOG_IN_VIEW, query)
    }

    #[track_caller]
    fn assert_redirects_to_log_in(response: &TestResponse) {
        response.assert_status_see_other();
        assert_eq!(response.header("location"), log_in_url(LEDGER_ROUTE));
    }
}
