//! Middleware for the RPC Proxy.
//!
//! Only `/auth/rpc` is wrapped: Request → RateLimit → Handler.

pub mod rate_limit;

pub use rate_limit::{
    extract_client_id, rate_limit_response, reset_task, RateLimitLayer, RateLimitService,
    RateLimitState,
};
