mod authenticator;
mod guard;
mod password;
mod token;

pub use authenticator::Authenticator;
pub use guard::{AccessGuard, AdminOnly, Authenticated, Privilege};
pub use password::{verify_password, PasswordHasher};
pub use token::{generate_key_files, TokenCheck, TokenService};
