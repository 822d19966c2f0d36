//! # Yatube Shared
//!
//! Types exchanged over the HTTP API, usable from both server and client.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
