//! # wa-sdk
//!
//! Async Rust client for WrapAPI, a hosted service that turns web pages into
//! JSON APIs ("API elements").
//!
//! A [`Client`] holds an API key and runs elements addressed by
//! `owner/repository/name/version`. A [`Session`] wraps a client and carries the
//! service's `stateToken` (its stand-in for a cookie jar) from one call to the
//! next.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use wa_sdk::{Client, Element};
//!
//! # async fn example() -> wa_sdk::Result<()> {
//! let client = Client::new("0123456789abcdefghijABCDEFGHIJkl")?;
//!
//! let login = Element::latest("acme", "shop", "login");
//! let orders = Element::new("acme", "shop", "orders", "1.0.0");
//!
//! let mut session = client.session();
//! session.run(&login, Some(&json!({"user": "me", "password": "secret"}))).await?;
//! let data = session.run(&orders, None).await?;
//! println!("{}", data["data"]);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, DEFAULT_HOST};
pub use error::{Error, RemoteError, Result};
pub use session::Session;
pub use transport::{HttpTransport, Transport, TransportRequest};
pub use types::*;
