//! SimpleLogin Common Types
//!
//! Wire types shared by the authentication backend and its clients.

pub mod error;
pub mod protocol;

pub use error::{ErrorCode, ErrorResponse};
pub use protocol::{
    LoginRequest, LoginResponse, RecoveryRequest, RecoveryResponse, SessionResponse, UserProfile,
};
