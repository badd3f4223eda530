//! Request-facing composition of provider data into API payloads.

pub mod nearby;
pub mod weather;
