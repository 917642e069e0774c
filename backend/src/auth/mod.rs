//! Authentication core: password checks, lockout and session tokens.

pub mod issuer;
pub mod lockout;
pub mod password;
pub mod token;

pub use issuer::{Session, SessionIssuer};
pub use lockout::LockoutPolicy;
pub use token::{SessionClaims, TokenError, TokenSigner};
