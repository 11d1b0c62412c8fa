//! Session state: the state machine position, the live challenge, and the
//! authenticated session artifact.

pub mod challenge;
pub mod persist;
pub mod state;
pub mod store;

pub use challenge::{ChallengeOverview, OtpDispatch, SecondFactorChallenge, SecurityQuestion};
pub use persist::{FileTokenCache, TokenCache};
pub use state::AuthState;
pub use store::{AuthenticatedSession, SessionStore};
