//! Gateway: the backend proxy between views and the text-generation provider.
//!
//! One HTTP port. `POST /api/gemini` takes `{prompt}` and answers `{response}` or `{error}`;
//! `GET /` is a health probe.

mod protocol;
mod server;

pub use protocol::{GatewayRequest, GatewayResponse, GATEWAY_PATH, GENERIC_FAILURE};
pub use server::{router, run_gateway, serve, GatewayState};
