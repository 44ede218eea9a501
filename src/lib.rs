//! tokenkit issues and verifies compact, tamper-evident and time-bounded
//! tokens.
//!
//! Tokens follow PASETO version 2: `v2.local` when the service holds a
//! symmetric key, `v2.public` when it holds an Ed25519 key pair.
//!
//! ```rust
//! use chrono::TimeDelta;
//! use tokenkit::{Footer, PayloadOptions, TokenService};
//!
//! let service = TokenService::symmetric([0x42; 32], Footer::default()).unwrap();
//! let token = service
//!     .create_token(
//!         PayloadOptions::new()
//!             .id("abc")
//!             .with("username", "joe")
//!             .duration(TimeDelta::minutes(1)),
//!     )
//!     .unwrap();
//!
//! let payload = service.verify_token(&token).unwrap();
//! assert_eq!(payload.get_string("username"), "joe");
//! ```

#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod paseto;
pub mod payload;
pub mod telemetry;
pub mod token;

pub use crypto::{KeyPair, Keys, SymmetricKey, generate_id};
pub use error::{Result, TokenError};
pub use payload::{Metadata, PayloadOptions, TokenPayload};
pub use token::{Footer, TokenService};
