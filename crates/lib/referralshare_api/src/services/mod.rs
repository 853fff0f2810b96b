//! Request-path helpers shared by handlers.

pub mod cookies;
