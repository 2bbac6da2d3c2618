//! # Telegram HTTP API
//!
//! A client for the Telegram Bot HTTP API. It supports:
//!
//! - Building requests (`GET` params as a query string, `POST` params as a form body)
//! - Sending them through a pluggable transport (reqwest by default)
//! - Synchronous or pending (awaited later) replies
//! - Typed API errors for `"ok": false` replies
//! - Optional lifecycle events through an attachable event bus
//!
//! For usage, see `demos/get_me.rs`.

pub mod bus;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{PreparedRequest, TelegramClient};
pub use config::Config;
pub use error::{ApiError, Error, Result};
pub use event::{Event, EventBus, EventEmission, IntoEvent};
pub use request::{Method, Request, RequestOptions};
pub use response::Response;
pub use transport::{HttpResponse, HttpTransport, PendingResponse, RawResponse, ReqwestTransport};
