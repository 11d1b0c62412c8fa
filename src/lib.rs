//! Twofold — client-side multi-factor login orchestration.
//!
//! Drives a hosted identity provider's multi-step login sequence: primary
//! credential check, second-factor challenge, selection among enrolled
//! factors (email OTP, SMS OTP, authenticator app, security questions),
//! one-time-code issuance and verification, and access-token lifecycle.
//! Presentation, input validation and navigation stay with the caller;
//! twofold tells it what the next step is.
//!
//! # Quick Start
//!
//! ```no_run
//! use twofold::prelude::*;
//!
//! # async fn example() -> twofold::error::Result<()> {
//! let config = AuthConfig::from_env()?;
//! let client = AuthClient::new(&config)?;
//!
//! match client.login(Credentials::new("a@b.com", "hunter2")).await? {
//!     LoginOutcome::SignedIn { session } => {
//!         println!("signed in: {}", session.access_token);
//!     }
//!     LoginOutcome::ChallengeRequired { challenge } => {
//!         client.select_factor(challenge.factors[0]).await?;
//!         client.request_otp().await?;
//!         let outcome = client.verify_otp("123456").await?;
//!         println!("signed in: {}", outcome.session.access_token);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod factor;
pub mod prelude;
pub mod session;
pub mod transport;
