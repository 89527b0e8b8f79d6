pub mod client_ip;
pub mod headers;
pub mod user_agent;

pub use client_ip::resolve_client_ip;
pub use headers::first_language;
pub use user_agent::classify;
