//! OAuth callback listener.
//!
//! A one-shot loopback HTTP listener that waits for the provider to redirect
//! the browser back with an authorization code.

use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::errors::AuthError;
use crate::auth::pkce::constant_time_eq;

/// Redirect URI registered for the desktop client
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/oauth2callback";

const MAX_REQUEST_BYTES: usize = 16 * 1024;
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// HTML response for successful authorization.
const HTML_SUCCESS: &str = r#"<!DOCTYPE html>
<html>
<head><title>AdMob MCP - Authorization Successful</title></head>
<body style="font-family: system-ui, sans-serif; text-align: center; padding-top: 4rem;">
  <h1>Authorization Successful</h1>
  <p>You can close this window and return to the terminal.</p>
</body>
</html>"#;

/// HTML response for failed authorization.
fn html_error(error: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>AdMob MCP - Authorization Failed</title></head>
<body style="font-family: system-ui, sans-serif; text-align: center; padding-top: 4rem;">
  <h1>Authorization Failed</h1>
  <p><code>{}</code></p>
</body>
</html>"#,
        html_escape(error)
    )
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Build an HTTP response.
fn http_response(status: u16, content_type: &str, body: &str) -> String {
    let status_text = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Unknown",
    };

    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        content_type,
        body.len(),
        body
    )
}

/// Query parameters of a request that hit the callback path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse the query of a callback URL
    pub fn from_url(url: &Url) -> Self {
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        Self {
            code: params.get("code").filter(|c| !c.is_empty()).cloned(),
            state: params.get("state").cloned(),
            error: params.get("error").cloned(),
            error_description: params.get("error_description").cloned(),
        }
    }

    /// Resolve the callback against the state that was issued
    pub fn into_code(self, expected_state: &str) -> Result<String, AuthError> {
        if let Some(error) = self.error {
            let reason = match self.error_description {
                Some(desc) => format!("{error}: {desc}"),
                None => error,
            };
            return Err(AuthError::MissingAuthCode(Some(reason)));
        }

        let code = self.code.ok_or(AuthError::MissingAuthCode(None))?;

        match self.state {
            Some(ref state) if constant_time_eq(state, expected_state) => Ok(code),
            _ => Err(AuthError::StateMismatch),
        }
    }
}

/// Listener bound to the redirect URI's host and port
#[derive(Debug)]
pub struct CallbackListener {
    listener: TcpListener,
    redirect_uri: Url,
}

impl CallbackListener {
    /// Bind the address named by `redirect_uri`.
    ///
    /// Port 0 binds an ephemeral port; [`Self::redirect_uri`] then reports the
    /// actual one.
    pub async fn bind(redirect_uri: &Url) -> Result<Self, AuthError> {
        let host = redirect_uri
            .host_str()
            .ok_or_else(|| AuthError::Config(format!("Redirect URI has no host: {redirect_uri}")))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = redirect_uri.port_or_known_default().unwrap_or(80);
        let addr = format!("{host}:{port}");

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .map_err(|e| AuthError::ListenerBind {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;

        let mut redirect_uri = redirect_uri.clone();
        if port == 0 {
            let bound = listener.local_addr().map_err(|e| AuthError::ListenerBind {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;
            redirect_uri
                .set_port(Some(bound.port()))
                .map_err(|_| AuthError::Config(format!("Cannot set port on {redirect_uri}")))?;
        }

        info!(addr = %addr, "OAuth callback listener bound");
        Ok(Self {
            listener,
            redirect_uri,
        })
    }

    /// Redirect URI to send to the provider
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    /// Wait for the first request on the callback path.
    ///
    /// Requests to any other path get a 404 and are ignored. The listener is
    /// consumed, so the port is released as soon as this returns.
    pub async fn wait_for_code(
        self,
        expected_state: &str,
        timeout: Duration,
    ) -> Result<String, AuthError> {
        match tokio::time::timeout(timeout, self.accept_callback(expected_state)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthError::CallbackTimeout(timeout)),
        }
    }

    async fn accept_callback(&self, expected_state: &str) -> Result<String, AuthError> {
        let callback_path = self.redirect_uri.path().to_string();

        loop {
            let (mut stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Error accepting connection");
                    continue;
                }
            };

            let target = match read_request_target(&mut stream).await {
                Some(target) => target,
                None => {
                    respond(&mut stream, 400, "text/plain", "Bad Request").await;
                    continue;
                }
            };

            let url = match self.redirect_uri.join(&target) {
                Ok(url) => url,
                Err(_) => {
                    respond(&mut stream, 400, "text/plain", "Invalid URL").await;
                    continue;
                }
            };

            if url.path() != callback_path {
                debug!(peer = %peer, path = url.path(), "Ignoring request outside the callback path");
                respond(&mut stream, 404, "text/plain", "Not Found").await;
                continue;
            }

            let params = CallbackParams::from_url(&url);
            debug!(
                has_code = params.code.is_some(),
                error = ?params.error,
                "Received OAuth callback"
            );

            let outcome = params.into_code(expected_state);
            match outcome {
                Ok(_) => respond(&mut stream, 200, "text/html", HTML_SUCCESS).await,
                Err(ref e) => respond(&mut stream, 400, "text/html", &html_error(&e.to_string())).await,
            }
            return outcome;
        }
    }
}

/// Read the request head and return the request target (path and query)
async fn read_request_target(stream: &mut TcpStream) -> Option<String> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let read_head = async {
        loop {
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
            if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_REQUEST_BYTES {
                break;
            }
        }
        Some(())
    };
    tokio::time::timeout(READ_TIMEOUT, read_head).await.ok()??;

    let request = String::from_utf8_lossy(&buffer);
    let mut parts = request.lines().next()?.split_whitespace();
    let _method = parts.next()?;
    let target = parts.next()?;
    target.starts_with('/').then(|| target.to_string())
}

async fn respond(stream: &mut TcpStream, status: u16, content_type: &str, body: &str) {
    let response = http_response(status, content_type, body);
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        debug!(error = %e, "Failed to write callback response");
    }
    let _ = stream.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> Url {
        Url::parse("http://127.0.0.1:0/oauth2callback").unwrap()
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("it's"), "it&#39;s");
    }

    #[test]
    fn test_html_error_escapes() {
        let html = html_error("<script>alert('xss')</script>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn test_callback_params_resolution() {
        let url = Url::parse("http://localhost:3000/oauth2callback?code=4%2Fabc&state=s1").unwrap();
        assert_eq!(CallbackParams::from_url(&url).into_code("s1").unwrap(), "4/abc");

        let wrong_state = CallbackParams::from_url(&url).into_code("other");
        assert_eq!(wrong_state, Err(AuthError::StateMismatch));

        let denied = Url::parse("http://localhost:3000/oauth2callback?error=access_denied&state=s1").unwrap();
        assert_eq!(
            CallbackParams::from_url(&denied).into_code("s1"),
            Err(AuthError::MissingAuthCode(Some("access_denied".to_string())))
        );

        let empty = Url::parse("http://localhost:3000/oauth2callback?code=&state=s1").unwrap();
        assert_eq!(
            CallbackParams::from_url(&empty).into_code("s1"),
            Err(AuthError::MissingAuthCode(None))
        );
    }

    #[tokio::test]
    async fn test_ephemeral_port_reported() {
        let listener = CallbackListener::bind(&loopback()).await.unwrap();
        assert_ne!(listener.redirect_uri().port(), Some(0));
        assert_eq!(listener.redirect_uri().path(), "/oauth2callback");
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let first = CallbackListener::bind(&loopback()).await.unwrap();
        let taken = first.redirect_uri().clone();
        let err = CallbackListener::bind(&taken).await.unwrap_err();
        assert!(matches!(err, AuthError::ListenerBind { .. }));
    }

    #[tokio::test]
    async fn test_other_paths_ignored_until_callback() {
        let listener = CallbackListener::bind(&loopback()).await.unwrap();
        let base = listener.redirect_uri().clone();

        let waiter = tokio::spawn(async move {
            listener
                .wait_for_code("xyz", Duration::from_secs(10))
                .await
        });

        let http = reqwest::Client::new();
        let favicon = http.get(base.join("/favicon.ico").unwrap()).send().await.unwrap();
        assert_eq!(favicon.status().as_u16(), 404);

        let mut callback = base.clone();
        callback.set_query(Some("code=the-code&state=xyz"));
        let page = http.get(callback).send().await.unwrap();
        assert_eq!(page.status().as_u16(), 200);
        assert!(page.text().await.unwrap().contains("Authorization Successful"));

        assert_eq!(waiter.await.unwrap().unwrap(), "the-code");
        assert!(CallbackListener::bind(&base).await.is_ok());
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let listener = CallbackListener::bind(&loopback()).await.unwrap();
        let err = listener
            .wait_for_code("xyz", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::CallbackTimeout(Duration::from_millis(50)));
    }
}
