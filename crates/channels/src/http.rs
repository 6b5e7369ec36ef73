//! HTTP execution primitive for provider calls.
//!
//! Every request races against the caller's timeout and cancellation token,
//! and every exchange (or transport failure) is written to the channel log.

use std::time::{Duration, Instant};

use {
    reqwest::header::{AUTHORIZATION, CONTENT_TYPE},
    secrecy::{ExposeSecret, Secret},
    serde::Serialize,
    tokio_util::sync::CancellationToken,
};

use crate::{Error, Result, clog::ChannelLog};

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Caller-supplied deadline and cancellation signal for one unit of work.
#[derive(Debug, Clone)]
pub struct SendContext {
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl Default for SendContext {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SEND_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }
}

impl SendContext {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Thin wrapper around a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// POST `body` as JSON, optionally with a bearer credential.
    ///
    /// Transport errors, timeouts and cancellation all come back as
    /// [`Error::ConnectionFailed`]. HTTP status is not interpreted here.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        ctx: &SendContext,
        url: &str,
        body: &T,
        bearer: Option<&Secret<String>>,
        clog: &mut ChannelLog,
    ) -> Result<HttpResponse> {
        let payload = serde_json::to_vec(body)?;
        let mut request_dump = format!("POST {url}\nContent-Type: application/json\n");
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
            request_dump.push_str(&format!("Authorization: Bearer {}\n", token.expose_secret()));
        }
        request_dump.push('\n');
        request_dump.push_str(&String::from_utf8_lossy(&payload));
        let request = request.body(payload);

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => Err(Error::connection("request cancelled")),
            res = tokio::time::timeout(ctx.timeout, execute(request)) => match res {
                Err(_) => Err(Error::connection(format!(
                    "request timed out after {}ms",
                    ctx.timeout.as_millis()
                ))),
                Ok(Err(e)) => Err(Error::connection(e)),
                Ok(Ok(response)) => Ok(response),
            },
        };
        let elapsed = started.elapsed();

        match outcome {
            Ok(response) => {
                clog.http(
                    "POST",
                    url,
                    Some(response.status),
                    &request_dump,
                    &response.text(),
                    elapsed,
                );
                Ok(response)
            },
            Err(err) => {
                clog.http("POST", url, None, &request_dump, "", elapsed);
                clog.error(err.code(), err.to_string());
                Err(err)
            },
        }
    }
}

async fn execute(request: reqwest::RequestBuilder) -> std::result::Result<HttpResponse, reqwest::Error> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    let body = response.bytes().await?;
    Ok(HttpResponse {
        status,
        body: body.to_vec(),
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            channel::Channel,
            clog::{ChannelLog, ChannelLogType},
        },
        serde_json::json,
    };

    fn clog() -> ChannelLog {
        let channel = Channel::new("chan", "MG", "2020").with_config("auth_token", "tok-123");
        ChannelLog::new(ChannelLogType::MsgSend, &channel)
    }

    #[tokio::test]
    async fn posts_json_with_bearer_and_records_trace() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send")
            .match_header("content-type", "application/json")
            .match_header("authorization", "Bearer tok-123")
            .match_body(mockito::Matcher::Json(json!({"hello": "world"})))
            .with_status(201)
            .with_body("created")
            .create_async()
            .await;

        let mut clog = clog();
        let token = Secret::new("tok-123".to_string());
        let response = HttpClient::default()
            .post_json(
                &SendContext::default(),
                &format!("{}/send", server.url()),
                &json!({"hello": "world"}),
                Some(&token),
                &mut clog,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 201);
        assert_eq!(response.text(), "created");
        let trace = &clog.http_logs()[0];
        assert_eq!(trace.status, Some(201));
        assert!(!trace.request.contains("tok-123"));
        assert!(clog.errors().is_empty());
    }

    #[tokio::test]
    async fn transport_error_is_connection_failure() {
        let mut clog = clog();
        // Port 9 (discard) on localhost is reliably closed in test sandboxes.
        let err = HttpClient::default()
            .post_json(
                &SendContext::with_timeout(Duration::from_secs(5)),
                "http://127.0.0.1:9/send",
                &json!({}),
                None,
                &mut clog,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionFailed { .. }));
        assert!(clog.has_error_code("connection_failed"));
        assert_eq!(clog.http_logs()[0].status, None);
    }

    #[tokio::test]
    async fn timeout_is_connection_failure() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut clog = clog();
        let err = HttpClient::default()
            .post_json(
                &SendContext::with_timeout(Duration::from_millis(100)),
                &format!("http://{addr}/send"),
                &json!({}),
                None,
                &mut clog,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionFailed { .. }));
        assert!(err.to_string().contains("timed out"));
        assert!(clog.has_error_code("connection_failed"));
    }

    #[tokio::test]
    async fn cancellation_is_connection_failure() {
        let ctx = SendContext::default();
        ctx.cancel.cancel();
        let mut clog = clog();
        let err = HttpClient::default()
            .post_json(&ctx, "http://127.0.0.1:9/send", &json!({}), None, &mut clog)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("cancelled"));
    }
}
