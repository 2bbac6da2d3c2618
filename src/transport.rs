//! # HTTP transport
//!
//! The client never talks to the network itself: it hands a prepared URL,
//! method, headers and encoded params to an [`HttpTransport`]. The crate ships
//! [`ReqwestTransport`]; anything else (a proxy layer, a recording fake in
//! tests) can be swapped in without touching the client.
//!
//! A transport either waits for the reply and returns
//! [`RawResponse::Resolved`], or, when the request is asynchronous, returns
//! [`RawResponse::Pending`] holding a future the caller awaits later.

use async_trait::async_trait;
use futures::future::BoxFuture;
use reqwest::Client;
use std::{
    collections::HashMap,
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use crate::{
    error::Result,
    request::{Method, RequestOptions},
};

/// A reply as read off the wire, before any Bot API interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new<B: Into<String>>(status: u16, body: B) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Drains a reqwest response into an owned reply.
    pub async fn read(resp: reqwest::Response) -> Result<Self> {
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.text().await?;
        Ok(Self { status, headers, body })
    }
}

/// A reply that has not arrived yet. Await it to get the [`HttpResponse`].
pub struct PendingResponse {
    inner: BoxFuture<'static, Result<HttpResponse>>,
}

impl PendingResponse {
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        Self { inner: Box::pin(fut) }
    }
}

impl Future for PendingResponse {
    type Output = Result<HttpResponse>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PendingResponse")
    }
}

/// What a transport hands back from [`HttpTransport::send`].
#[derive(Debug)]
pub enum RawResponse {
    Resolved(HttpResponse),
    Pending(PendingResponse),
}

/// Performs the actual network call for the client.
///
/// Timeouts are configured before every send; a transport must apply them to
/// the next call it makes. Transport-level failures are returned as errors and
/// are never retried by the client.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    fn set_timeout(&mut self, timeout: Duration);

    fn set_connect_timeout(&mut self, connect_timeout: Duration);

    async fn send(
        &self,
        url: &str,
        method: Method,
        headers: &HashMap<String, String>,
        options: &RequestOptions,
        is_async: bool,
    ) -> Result<RawResponse>;
}

/// Default transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: Client,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_user_agent(None)
    }

    pub fn with_user_agent(user_agent: Option<String>) -> Result<Self> {
        let client = Self::build_client(user_agent.as_deref(), None)?;
        Ok(Self {
            client,
            user_agent,
            timeout: None,
            connect_timeout: None,
        })
    }

    fn build_client(user_agent: Option<&str>, connect_timeout: Option<Duration>) -> Result<Client> {
        let mut builder = Client::builder();
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    // reqwest only takes a connect timeout at client build time, so the
    // client is rebuilt whenever the value changes.
    fn set_connect_timeout(&mut self, connect_timeout: Duration) {
        if self.connect_timeout == Some(connect_timeout) {
            return;
        }
        match Self::build_client(self.user_agent.as_deref(), Some(connect_timeout)) {
            Ok(client) => {
                self.client = client;
                self.connect_timeout = Some(connect_timeout);
            }
            Err(e) => {
                tracing::warn!("keeping previous HTTP client, rebuild failed: {}", e);
            }
        }
    }

    async fn send(
        &self,
        url: &str,
        method: Method,
        headers: &HashMap<String, String>,
        options: &RequestOptions,
        is_async: bool,
    ) -> Result<RawResponse> {
        let mut req = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        for (name, value) in headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        req = match options {
            RequestOptions::Query(query) => req.query(query),
            RequestOptions::Form(form) => req.form(form),
        };

        if is_async {
            return Ok(RawResponse::Pending(PendingResponse::new(async move {
                let resp = req.send().await?;
                HttpResponse::read(resp).await
            })));
        }
        let resp = req.send().await?;
        Ok(RawResponse::Resolved(HttpResponse::read(resp).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pending_response_resolves_to_inner_reply() {
        let pending = PendingResponse::new(async { Ok(HttpResponse::new(200, "{\"ok\":true}")) });
        let reply = pending.await.unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "{\"ok\":true}");
    }

    #[test]
    fn connect_timeout_rebuild_is_skipped_when_unchanged() {
        let mut transport = ReqwestTransport::new().unwrap();
        transport.set_connect_timeout(Duration::from_secs(3));
        assert_eq!(transport.connect_timeout, Some(Duration::from_secs(3)));
        transport.set_connect_timeout(Duration::from_secs(3));
        transport.set_timeout(Duration::from_secs(30));
        assert_eq!(transport.timeout, Some(Duration::from_secs(30)));
    }
}
