//! Identity widget capability.
//!
//! The sign-in widget is an external collaborator. Flows only see the two
//! callbacks in [`CredentialCallbacks`]; whatever hosts the widget calls one
//! of them once per attempt.
//!
//! [`LoopbackWidget`] is the real implementation: it serves a one-page
//! Google sign-in button on `127.0.0.1`, opens it in the system browser and
//! waits for the page to redirect back with the credential.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

/// How long the loopback page waits for the user before giving up.
pub const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(120);

const CALLBACK_PATH: &str = "/callback";
const MAX_REQUEST_BYTES: usize = 16 * 1024;
/// An accepted connection that sends no request within this window is dropped.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// What the widget reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialResponse {
    /// Success callback. The provider may omit the credential.
    Credential(Option<String>),
    /// Error callback, no payload.
    Error,
}

impl CredentialResponse {
    /// Routes this response to the matching callback.
    pub fn deliver(self, callbacks: &dyn CredentialCallbacks) {
        match self {
            CredentialResponse::Credential(credential) => callbacks.on_success(credential),
            CredentialResponse::Error => callbacks.on_error(),
        }
    }
}

/// Callbacks a widget invokes.
pub trait CredentialCallbacks: Send + Sync {
    /// The provider returned (possibly without a credential).
    fn on_success(&self, credential: Option<String>);

    /// The widget failed (popup blocked, script failed, user gave up, timeout).
    fn on_error(&self);

    /// The widget is showing and can be reached at `url`.
    fn on_prompt(&self, _url: &str) {}
}

/// Future returned by [`IdentityWidget::sign_in`].
pub type SignInFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Something that can show a sign-in prompt.
pub trait IdentityWidget: Send + Sync {
    /// Shows the prompt. The future completes once a callback has fired or
    /// `cancel` was triggered; after cancellation no callback fires.
    fn sign_in(&self, callbacks: Arc<dyn CredentialCallbacks>, cancel: CancellationToken)
    -> SignInFuture;
}

/// Google sign-in button served from a loopback HTTP listener.
#[derive(Debug, Clone)]
pub struct LoopbackWidget {
    client_id: String,
    port: u16,
    timeout: Duration,
    open_browser: bool,
}

impl LoopbackWidget {
    pub fn new(client_id: impl Into<String>, port: u16) -> Self {
        Self {
            client_id: client_id.into(),
            port,
            timeout: SIGN_IN_TIMEOUT,
            open_browser: true,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables launching the system browser; the URL is still reported
    /// through [`CredentialCallbacks::on_prompt`].
    #[must_use]
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }
}

impl IdentityWidget for LoopbackWidget {
    fn sign_in(
        &self,
        callbacks: Arc<dyn CredentialCallbacks>,
        cancel: CancellationToken,
    ) -> SignInFuture {
        let widget = self.clone();
        Box::pin(async move {
            if serve_sign_in(&widget, callbacks.as_ref(), &cancel).await {
                return;
            }
            if !cancel.is_cancelled() {
                callbacks.on_error();
            }
        })
    }
}

/// Runs the loopback exchange. Returns true if a callback was delivered.
async fn serve_sign_in(
    widget: &LoopbackWidget,
    callbacks: &dyn CredentialCallbacks,
    cancel: &CancellationToken,
) -> bool {
    let listener = match TcpListener::bind(("127.0.0.1", widget.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::warn!(port = widget.port, error = %err, "failed to bind sign-in listener");
            return false;
        }
    };
    let port = match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read sign-in listener address");
            return false;
        }
    };

    let state = uuid::Uuid::new_v4().to_string();
    let url = format!("http://127.0.0.1:{port}/?state={state}");
    if widget.client_id.is_empty() {
        tracing::warn!("google_client_id is empty; the sign-in button will not load");
    }
    callbacks.on_prompt(&url);
    if widget.open_browser
        && let Err(err) = open::that(&url)
    {
        tracing::warn!(error = %err, "failed to open browser for sign-in");
    }
    tracing::info!(port, "waiting for sign-in callback");

    let deadline = tokio::time::sleep(widget.timeout);
    tokio::pin!(deadline);

    loop {
        let accepted = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("sign-in cancelled");
                return false;
            }
            () = &mut deadline => {
                tracing::info!("sign-in timed out");
                return false;
            }
            accepted = listener.accept() => accepted,
        };

        let mut stream = match accepted {
            Ok((stream, _)) => stream,
            Err(err) => {
                tracing::warn!(error = %err, "sign-in listener accept failed");
                return false;
            }
        };

        let request = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("sign-in cancelled");
                return false;
            }
            () = &mut deadline => {
                tracing::info!("sign-in timed out");
                return false;
            }
            read = tokio::time::timeout(REQUEST_READ_TIMEOUT, read_request(&mut stream)) => {
                if let Ok(request) = read {
                    request
                } else {
                    tracing::debug!("dropping idle sign-in connection");
                    continue;
                }
            }
        };

        let (response, outcome) = respond(&request, &state, &widget.client_id);
        if let Err(err) = stream.write_all(response.as_bytes()).await {
            tracing::debug!(error = %err, "failed to write sign-in response");
        }
        let _ = stream.shutdown().await;

        if cancel.is_cancelled() {
            return false;
        }
        if let Some(outcome) = outcome {
            outcome.deliver(callbacks);
            return true;
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buffer = vec![0u8; MAX_REQUEST_BYTES];
    let mut filled = 0;
    // The request line is all we need; stop at the end of headers.
    while filled < buffer.len() {
        match stream.read(&mut buffer[filled..]).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                filled += n;
                if buffer[..filled].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buffer[..filled]).into_owned()
}

/// A request the loopback listener understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoopbackRequest {
    /// `GET /`, the sign-in page.
    Page { state: Option<String> },
    /// `GET /callback`, the page reporting back.
    Callback {
        state: Option<String>,
        response: CredentialResponse,
    },
    /// Anything else (favicon, garbage).
    Other,
}

pub(crate) fn parse_request(request: &str) -> LoopbackRequest {
    let Some(request_line) = request.lines().next() else {
        return LoopbackRequest::Other;
    };
    let mut parts = request_line.split_whitespace();
    let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
        return LoopbackRequest::Other;
    };
    let Ok(url) = url::Url::parse(&format!("http://localhost{target}")) else {
        return LoopbackRequest::Other;
    };

    let query = |key: &str| {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    };
    let state = query("state");

    match url.path() {
        "/" => LoopbackRequest::Page { state },
        CALLBACK_PATH => {
            let response = if query("error").is_some() {
                CredentialResponse::Error
            } else {
                CredentialResponse::Credential(query("credential"))
            };
            LoopbackRequest::Callback { state, response }
        }
        _ => LoopbackRequest::Other,
    }
}

/// Builds the HTTP response and, for a valid callback, the outcome to deliver.
fn respond(request: &str, state: &str, client_id: &str) -> (String, Option<CredentialResponse>) {
    match parse_request(request) {
        LoopbackRequest::Page { state: Some(s) } if s == state => {
            (http_response("200 OK", &sign_in_page(client_id, state)), None)
        }
        LoopbackRequest::Callback {
            state: Some(s),
            response,
        } if s == state => {
            let body = match response {
                CredentialResponse::Credential(_) => {
                    "<html><body><h3>Signed in</h3><p>You can close this window and return to the terminal.</p></body></html>"
                }
                CredentialResponse::Error => {
                    "<html><body><h3>Sign-in failed</h3><p>Return to the terminal to try again.</p></body></html>"
                }
            };
            (http_response("200 OK", body), Some(response))
        }
        LoopbackRequest::Page { .. } | LoopbackRequest::Callback { .. } => {
            tracing::warn!("sign-in request with mismatched state");
            (
                http_response(
                    "400 Bad Request",
                    "<html><body><h3>Invalid sign-in request</h3></body></html>",
                ),
                None,
            )
        }
        LoopbackRequest::Other => (http_response("404 Not Found", ""), None),
    }
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn sign_in_page(client_id: &str, state: &str) -> String {
    let client_id = html_escape(client_id);
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Sign in to Bifrost</title>
<script>
function bifrostReport(query) {{
  window.location.replace("{CALLBACK_PATH}?state={state}&" + query);
}}
function onCredential(response) {{
  bifrostReport("credential=" + encodeURIComponent(response.credential || ""));
}}
</script>
<script src="https://accounts.google.com/gsi/client" async onerror="bifrostReport('error=1')"></script>
</head>
<body>
<h1>Sign in to Bifrost</h1>
<div id="g_id_onload" data-client_id="{client_id}" data-callback="onCredential" data-auto_prompt="false"></div>
<div class="g_id_signin" data-type="standard"></div>
<p><a href="{CALLBACK_PATH}?state={state}&error=1">Cancel</a></p>
</body>
</html>
"#
    )
}

fn html_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn as_callbacks(recorder: &Arc<Recorder>) -> Arc<dyn CredentialCallbacks> {
        Arc::clone(recorder) as Arc<dyn CredentialCallbacks>
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<CredentialResponse>>,
        prompts: Mutex<Vec<String>>,
    }

    impl CredentialCallbacks for Recorder {
        fn on_success(&self, credential: Option<String>) {
            self.events
                .lock()
                .unwrap()
                .push(CredentialResponse::Credential(credential));
        }

        fn on_error(&self) {
            self.events.lock().unwrap().push(CredentialResponse::Error);
        }

        fn on_prompt(&self, url: &str) {
            self.prompts.lock().unwrap().push(url.to_string());
        }
    }

    #[test]
    fn parse_callback_with_credential() {
        let request = "GET /callback?state=s1&credential=abc.def HTTP/1.1\r\nHost: x\r\n\r\n";
        assert_eq!(
            parse_request(request),
            LoopbackRequest::Callback {
                state: Some("s1".to_string()),
                response: CredentialResponse::Credential(Some("abc.def".to_string())),
            }
        );
    }

    #[test]
    fn parse_callback_without_credential() {
        let request = "GET /callback?state=s1 HTTP/1.1\r\n\r\n";
        assert_eq!(
            parse_request(request),
            LoopbackRequest::Callback {
                state: Some("s1".to_string()),
                response: CredentialResponse::Credential(None),
            }
        );
    }

    #[test]
    fn parse_callback_error_wins_over_credential() {
        let request = "GET /callback?state=s1&error=1&credential=x HTTP/1.1\r\n\r\n";
        assert!(matches!(
            parse_request(request),
            LoopbackRequest::Callback {
                response: CredentialResponse::Error,
                ..
            }
        ));
    }

    #[test]
    fn parse_page_and_other() {
        assert_eq!(
            parse_request("GET /?state=s1 HTTP/1.1\r\n\r\n"),
            LoopbackRequest::Page {
                state: Some("s1".to_string())
            }
        );
        assert_eq!(
            parse_request("GET /favicon.ico HTTP/1.1\r\n\r\n"),
            LoopbackRequest::Other
        );
        assert_eq!(
            parse_request("POST /callback HTTP/1.1\r\n\r\n"),
            LoopbackRequest::Other
        );
        assert_eq!(parse_request(""), LoopbackRequest::Other);
    }

    #[test]
    fn respond_rejects_mismatched_state() {
        let (response, outcome) = respond(
            "GET /callback?state=evil&credential=x HTTP/1.1\r\n\r\n",
            "good",
            "client",
        );
        assert!(response.starts_with("HTTP/1.1 400"));
        assert_eq!(outcome, None);
    }

    #[test]
    fn sign_in_page_escapes_client_id() {
        let page = sign_in_page("a\"b<c>", "s1");
        assert!(page.contains("data-client_id=\"a&quot;b&lt;c&gt;\""));
        assert!(page.contains("/callback?state=s1&"));
    }

    #[test]
    fn deliver_routes_to_matching_callback() {
        let recorder = Recorder::default();
        CredentialResponse::Credential(Some("t".to_string())).deliver(&recorder);
        CredentialResponse::Error.deliver(&recorder);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                CredentialResponse::Credential(Some("t".to_string())),
                CredentialResponse::Error
            ]
        );
    }

    async fn get(url: &str) -> String {
        let url = url::Url::parse(url).unwrap();
        let port = url.port().unwrap();
        let target = match url.query() {
            Some(q) => format!("{}?{q}", url.path()),
            None => url.path().to_string(),
        };
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        stream
            .write_all(format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").as_bytes())
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    async fn wait_for_prompt(recorder: &Recorder) -> String {
        for _ in 0..200 {
            if let Some(url) = recorder.prompts.lock().unwrap().first().cloned() {
                return url;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("widget never reported its URL");
    }

    #[tokio::test]
    async fn loopback_widget_delivers_credential() {
        let recorder = Arc::new(Recorder::default());
        let widget = LoopbackWidget::new("client-id", 0).without_browser();
        let task = tokio::spawn(widget.sign_in(as_callbacks(&recorder), CancellationToken::new()));

        let page_url = wait_for_prompt(&recorder).await;
        let page = get(&page_url).await;
        assert!(page.starts_with("HTTP/1.1 200"));
        assert!(page.contains("data-client_id=\"client-id\""));

        let state = page_url.split("state=").nth(1).unwrap().to_string();
        let base = page_url.split("/?").next().unwrap();
        let callback = format!("{base}/callback?state={state}&credential=jwt-token");
        let response = get(&callback).await;
        assert!(response.contains("Signed in"));

        task.await.unwrap();
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![CredentialResponse::Credential(Some("jwt-token".to_string()))]
        );
    }

    #[tokio::test]
    async fn loopback_widget_reports_error_on_timeout() {
        let recorder = Arc::new(Recorder::default());
        let widget = LoopbackWidget::new("", 0)
            .without_browser()
            .with_timeout(Duration::from_millis(50));

        widget
            .sign_in(as_callbacks(&recorder), CancellationToken::new())
            .await;

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![CredentialResponse::Error]
        );
    }

    #[tokio::test]
    async fn idle_connection_does_not_block_timeout() {
        let recorder = Arc::new(Recorder::default());
        let widget = LoopbackWidget::new("", 0)
            .without_browser()
            .with_timeout(Duration::from_millis(200));
        let task = tokio::spawn(widget.sign_in(as_callbacks(&recorder), CancellationToken::new()));

        let url = url::Url::parse(&wait_for_prompt(&recorder).await).unwrap();
        let _idle = TcpStream::connect(("127.0.0.1", url.port().unwrap()))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("widget should give up on its deadline")
            .unwrap();
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![CredentialResponse::Error]
        );
    }

    #[tokio::test]
    async fn idle_connection_does_not_block_cancel() {
        let recorder = Arc::new(Recorder::default());
        let widget = LoopbackWidget::new("", 0).without_browser();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(widget.sign_in(as_callbacks(&recorder), cancel.clone()));

        let url = url::Url::parse(&wait_for_prompt(&recorder).await).unwrap();
        let port = url.port().unwrap();
        let _idle = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("widget should stop when cancelled")
            .unwrap();
        assert!(recorder.events.lock().unwrap().is_empty());
        // The listener is gone, so a fixed port can be bound again.
        assert!(TcpListener::bind(("127.0.0.1", port)).await.is_ok());
    }

    #[tokio::test]
    async fn loopback_widget_is_silent_after_cancel() {
        let recorder = Arc::new(Recorder::default());
        let widget = LoopbackWidget::new("", 0).without_browser();
        let cancel = CancellationToken::new();
        cancel.cancel();

        widget.sign_in(as_callbacks(&recorder), cancel).await;

        assert!(recorder.events.lock().unwrap().is_empty());
    }
}
