//! Wraps transport replies into Bot API responses.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

use crate::{
    error::{ApiError, Error, Result},
    request::Request,
    transport::{HttpResponse, PendingResponse, RawResponse},
};

static NULL: Value = Value::Null;

/// The outcome of one Bot API call, tied to the request that produced it.
#[derive(Debug)]
pub struct Response {
    request: Arc<Request>,
    state: State,
}

#[derive(Debug)]
enum State {
    Decoded(Decoded),
    Pending(PendingResponse),
}

#[derive(Debug)]
struct Decoded {
    http_status: u16,
    headers: HashMap<String, String>,
    body: String,
    decoded: Value,
}

impl Decoded {
    fn new(reply: HttpResponse) -> Self {
        let decoded = match serde_json::from_str::<Value>(&reply.body) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(status = reply.status, "response body is not JSON: {}", e);
                Value::Null
            }
        };
        Self {
            http_status: reply.status,
            headers: reply.headers,
            body: reply.body,
            decoded,
        }
    }

    // An explicit `"ok"` flag wins; without one, a non-2xx status is a failure.
    fn is_error(&self) -> bool {
        match self.decoded.get("ok").and_then(Value::as_bool) {
            Some(ok) => !ok,
            None => !(200..300).contains(&self.http_status),
        }
    }
}

impl Response {
    /// Wraps a raw reply. Resolved replies are decoded right away; pending ones
    /// stay untouched until [`Response::resolve`] is awaited.
    pub fn new(request: Arc<Request>, raw: RawResponse) -> Self {
        let state = match raw {
            RawResponse::Resolved(reply) => State::Decoded(Decoded::new(reply)),
            RawResponse::Pending(pending) => State::Pending(pending),
        };
        Self { request, state }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending(_))
    }

    /// `None` while the response is pending.
    pub fn http_status_code(&self) -> Option<u16> {
        self.decoded().map(|d| d.http_status)
    }

    pub fn headers(&self) -> Option<&HashMap<String, String>> {
        self.decoded().map(|d| &d.headers)
    }

    /// Raw body text.
    pub fn body(&self) -> Option<&str> {
        self.decoded().map(|d| d.body.as_str())
    }

    /// Decoded JSON body; `Null` while pending or when the body is not JSON.
    pub fn decoded_body(&self) -> &Value {
        self.decoded().map(|d| &d.decoded).unwrap_or(&NULL)
    }

    /// The `result` field of a successful reply.
    pub fn result(&self) -> Option<&Value> {
        self.decoded_body().get("result")
    }

    pub fn result_as<T: DeserializeOwned>(&self) -> Result<T> {
        let result = self.result().cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(result)?)
    }

    /// True when the API reported a failure. Always false while pending.
    pub fn is_error(&self) -> bool {
        self.decoded().map(Decoded::is_error).unwrap_or(false)
    }

    /// The error this response stands for, if it is an error response.
    pub fn thrown_exception(&self) -> Option<Error> {
        let decoded = self.decoded().filter(|d| d.is_error())?;
        Some(Error::Api(ApiError::from_body(
            &decoded.decoded,
            Some(decoded.http_status),
        )))
    }

    /// Turns an error response into `Err`.
    pub fn into_result(self) -> Result<Self> {
        match self.thrown_exception() {
            Some(err) => {
                tracing::warn!(endpoint = %self.request.endpoint(), "API error: {}", err);
                Err(err)
            }
            None => Ok(self),
        }
    }

    /// Waits for a pending reply, decodes it and raises API errors.
    /// Already resolved responses are only checked for errors.
    pub async fn resolve(self) -> Result<Self> {
        let Response { request, state } = self;
        let state = match state {
            State::Pending(pending) => State::Decoded(Decoded::new(pending.await?)),
            decoded => decoded,
        };
        Response { request, state }.into_result()
    }

    fn decoded(&self) -> Option<&Decoded> {
        match &self.state {
            State::Decoded(d) => Some(d),
            State::Pending(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use serde_json::json;

    fn request() -> Arc<Request> {
        Arc::new(Request::new("T", Method::Get, "getMe").unwrap())
    }

    fn resolved(status: u16, body: &str) -> Response {
        Response::new(request(), RawResponse::Resolved(HttpResponse::new(status, body)))
    }

    #[test]
    fn successful_reply_is_decoded() {
        let resp = resolved(200, r#"{"ok":true,"result":{"id":1,"is_bot":true}}"#);
        assert!(!resp.is_error());
        assert!(!resp.is_pending());
        assert_eq!(resp.http_status_code(), Some(200));
        assert_eq!(resp.result(), Some(&json!({ "id": 1, "is_bot": true })));
        assert!(resp.thrown_exception().is_none());
        assert_eq!(resp.request().endpoint(), "getMe");
    }

    #[test]
    fn ok_false_is_an_error() {
        let resp = resolved(
            400,
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        );
        assert!(resp.is_error());
        match resp.thrown_exception() {
            Some(Error::Api(err)) => {
                assert_eq!(err.error_code, Some(400));
                assert_eq!(err.description, "Bad Request: chat not found");
            }
            other => panic!("expected API error, got {:?}", other),
        }
        assert!(resp.into_result().is_err());
    }

    #[test]
    fn non_json_failure_status_is_an_error() {
        let resp = resolved(502, "<html>Bad Gateway</html>");
        assert_eq!(resp.decoded_body(), &Value::Null);
        assert_eq!(resp.body(), Some("<html>Bad Gateway</html>"));
        assert!(resp.is_error());
        let err = resp.thrown_exception().unwrap();
        assert_eq!(err.api_error().unwrap().error_code, Some(502));
    }

    #[test]
    fn result_as_deserializes_typed_result() {
        #[derive(serde::Deserialize)]
        struct User {
            id: i64,
            username: String,
        }
        let resp = resolved(200, r#"{"ok":true,"result":{"id":7,"username":"bot"}}"#);
        let user: User = resp.result_as().unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "bot");
    }

    #[tokio::test]
    async fn pending_reply_is_decoded_on_resolve() {
        let pending = PendingResponse::new(async { Ok(HttpResponse::new(200, r#"{"ok":true,"result":true}"#)) });
        let resp = Response::new(request(), RawResponse::Pending(pending));
        assert!(resp.is_pending());
        assert!(!resp.is_error());
        assert_eq!(resp.http_status_code(), None);
        assert_eq!(resp.decoded_body(), &Value::Null);

        let resp = resp.resolve().await.unwrap();
        assert!(!resp.is_pending());
        assert_eq!(resp.result(), Some(&json!(true)));
    }

    #[tokio::test]
    async fn pending_error_is_raised_on_resolve() {
        let pending = PendingResponse::new(async {
            Ok(HttpResponse::new(401, r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#))
        });
        let err = Response::new(request(), RawResponse::Pending(pending))
            .resolve()
            .await
            .unwrap_err();
        assert_eq!(err.api_error().unwrap().description, "Unauthorized");
    }

    #[tokio::test]
    async fn pending_transport_failure_propagates() {
        let pending = PendingResponse::new(async { Err(Error::Http("connection reset".into())) });
        let err = Response::new(request(), RawResponse::Pending(pending))
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
