//! AdVision API Client
//!
//! HTTP layer shared by every resource:
//!
//! - **ApiClient**: verb-scoped requests against the backend base URL
//! - **RequestFlow**: per-request state machine for the refresh-and-retry cycle
//! - **ApiError**: transport, auth, validation, and server failures
//!
//! ## Session handling
//!
//! 1. The stored access token is attached as a bearer credential
//! 2. A 401 exchanges the refresh token for a new access token
//! 3. The original request is retried once with the new token
//! 4. If the refresh cannot happen, both tokens are cleared and the
//!    caller receives [`ApiError::Unauthorized`]

mod error;
mod flow;
mod http;
mod request;

pub use error::{ApiError, ApiResult, AuthFailure, FieldErrors};
pub use flow::{Event, FlowError, Outcome, RequestFlow, Stage};
pub use http::{ApiClient, ClientConfig};
pub use request::{ApiResponse, RequestBody, RequestOptions, ResponseType};
