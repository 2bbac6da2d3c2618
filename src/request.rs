//! Descriptor of a single outgoing Bot API call.

use serde_json::{Map, Value};
use std::{collections::HashMap, fmt, time::Duration};

use crate::{
    config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT},
    error::{Error, Result},
};

/// HTTP methods understood by the Bot API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded params handed to the transport: a query string for GET, a form body for POST.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestOptions {
    Query(Vec<(String, String)>),
    Form(Vec<(String, String)>),
}

/// One Bot API call. Built once, then only read.
#[derive(Clone, Debug)]
pub struct Request {
    access_token: String,
    method: Method,
    endpoint: String,
    params: Map<String, Value>,
    headers: HashMap<String, String>,
    timeout: Duration,
    connect_timeout: Duration,
    is_async: bool,
}

impl Request {
    /// Creates a request; the endpoint must not be empty.
    pub fn new<T: Into<String>, E: Into<String>>(access_token: T, method: Method, endpoint: E) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(Error::invalid_argument("request endpoint must not be empty"));
        }
        Ok(Self {
            access_token: access_token.into(),
            method,
            endpoint,
            params: Map::new(),
            headers: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            is_async: false,
        })
    }

    pub fn with_param<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merges every field of a JSON object into the params; other values are rejected.
    pub fn with_params(mut self, params: Value) -> Result<Self> {
        match params {
            Value::Object(map) => {
                self.params.extend(map);
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(Error::invalid_argument(format!(
                "request params must be a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Asks the transport for a pending response instead of waiting for it.
    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Params as form fields for a POST body.
    pub fn post_params(&self) -> Vec<(String, String)> {
        encode_params(&self.params)
    }

    /// The option payload the transport receives for this request's method.
    pub fn options(&self) -> RequestOptions {
        match self.method {
            Method::Post => RequestOptions::Form(self.post_params()),
            Method::Get => RequestOptions::Query(encode_params(&self.params)),
        }
    }
}

// Strings go out verbatim, nulls are dropped, anything else is sent as JSON text.
fn encode_params(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key.clone(), s.clone())),
            other => Some((key.clone(), other.to_string())),
        })
        .collect()
}
