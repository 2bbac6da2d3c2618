//! # Telegram Client
//!
//! Turns a [`Request`] into a Bot API call:
//! - the URL is `base_bot_url + access_token + "/" + endpoint`
//! - GET params travel as a query string, POST params as a form body
//! - the transport is configured with the request's timeouts before each send
//! - the reply is wrapped in a [`Response`]; API failures come back as `Err`
//!
//! The client keeps no state between calls besides its transport and event
//! bus. It is meant for sequential use; give each concurrent caller its own
//! client or wrap it in a lock.

use serde_json::json;
use std::{collections::HashMap, sync::Arc};

use crate::{
    config::{Config, BASE_BOT_URL},
    error::Result,
    event::{Event, EventBus, EventEmission},
    request::{Method, Request},
    response::Response,
    transport::{HttpTransport, ReqwestTransport},
};

/// Emitted before the transport is called.
pub const REQUEST_SENDING: &str = "request.sending";
/// Emitted once a resolved reply has been wrapped.
pub const RESPONSE_RECEIVED: &str = "response.received";

/// Everything the transport needs besides the encoded params.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: String,
    pub method: Method,
    pub headers: HashMap<String, String>,
    pub is_async: bool,
}

/// The main Telegram client struct.
pub struct TelegramClient {
    /// Transport performing the network calls
    http_client_handler: Box<dyn HttpTransport>,
    /// Configuration
    config: Config,
    /// Lifecycle event emission (no-op until a bus is attached)
    events: EventEmission,
}

impl TelegramClient {
    /// Creates a new client with default configuration and the reqwest transport.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Creates a new client with custom configuration and the reqwest transport.
    pub fn with_config(config: Config) -> Result<Self> {
        let transport = ReqwestTransport::with_user_agent(config.user_agent.clone())?;
        Ok(Self::with_transport(Box::new(transport), config))
    }

    /// Creates a new client on top of a caller-supplied transport.
    pub fn with_transport(transport: Box<dyn HttpTransport>, config: Config) -> Self {
        Self {
            http_client_handler: transport,
            config,
            events: EventEmission::new(),
        }
    }

    pub fn http_client_handler(&self) -> &dyn HttpTransport {
        self.http_client_handler.as_ref()
    }

    pub fn set_http_client_handler(&mut self, transport: Box<dyn HttpTransport>) -> &mut Self {
        self.http_client_handler = transport;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn events(&self) -> &EventEmission {
        &self.events
    }

    /// Attaches (or with `None`, detaches) the bus lifecycle events go to.
    pub fn set_event_bus(&mut self, bus: Option<Arc<dyn EventBus>>) -> &mut Self {
        self.events.set_event_bus(bus);
        self
    }

    /// The configured base URL, or the public Bot API one.
    pub fn base_bot_url(&self) -> &str {
        self.config.base_bot_url.as_deref().unwrap_or(BASE_BOT_URL)
    }

    /// Starts a request carrying the configured timeouts.
    pub fn request<T: Into<String>, E: Into<String>>(
        &self,
        access_token: T,
        method: Method,
        endpoint: E,
    ) -> Result<Request> {
        Ok(Request::new(access_token, method, endpoint)?
            .with_timeout(self.config.timeout)
            .with_connect_timeout(self.config.connect_timeout))
    }

    /// Computes the URL and transport settings for a request. Params never go
    /// into the URL here; the endpoint is used as given.
    pub fn prepare_request(&self, request: &Request) -> PreparedRequest {
        let url = format!(
            "{}{}/{}",
            self.base_bot_url(),
            request.access_token(),
            request.endpoint()
        );
        PreparedRequest {
            url,
            method: request.method(),
            headers: request.headers().clone(),
            is_async: request.is_async(),
        }
    }

    /// Sends a request and wraps the reply.
    ///
    /// Transport failures are returned unchanged. An API failure is returned as
    /// [`crate::error::Error::Api`] instead of a response. For asynchronous
    /// requests the response comes back pending; call [`Response::resolve`].
    pub async fn send_request(&mut self, request: Request) -> Result<Response> {
        let request = Arc::new(request);
        let PreparedRequest {
            url,
            method,
            headers,
            is_async,
        } = self.prepare_request(&request);
        let options = request.options();

        tracing::debug!(endpoint = %request.endpoint(), %method, is_async, "sending request");
        self.events.emit(Event::new(
            REQUEST_SENDING,
            json!({ "endpoint": request.endpoint(), "method": method.as_str() }),
        ))?;

        self.http_client_handler.set_timeout(request.timeout());
        self.http_client_handler
            .set_connect_timeout(request.connect_timeout());
        let raw = self
            .http_client_handler
            .send(&url, method, &headers, &options, is_async)
            .await?;

        let response = Response::new(Arc::clone(&request), raw);
        if !response.is_pending() {
            tracing::debug!(
                endpoint = %request.endpoint(),
                status = response.http_status_code(),
                "received response"
            );
            self.events.emit(Event::new(
                RESPONSE_RECEIVED,
                json!({
                    "endpoint": request.endpoint(),
                    "status": response.http_status_code(),
                    "ok": !response.is_error(),
                }),
            ))?;
        }
        response.into_result()
    }
}
