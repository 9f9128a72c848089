//! # sr-api: HTTP serving layer for ssrank
//!
//! Exposes the discovery pipeline and the output formats over HTTP:
//!
//! | route | response |
//! |---|---|
//! | `GET /api/countries` | `{"countries": [...]}` |
//! | `POST /api/find-vpn` | best servers with config links and an encoded subscription |
//! | `GET /api/subscription?country=` | plain `ss://` list |
//! | `GET /api/sing-box?country=` | sing-box client config |
//! | `GET /api/hiddify?country=` | Hiddify subscription with metadata header |

#![deny(unused_must_use)]

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use server::{bind_and_serve, create_app, serve, ApiState, RESULT_LIMIT};
