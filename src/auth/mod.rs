pub mod extractors;
pub mod password;
pub mod policy;
pub mod principal;

pub use extractors::AuthUser;
pub use principal::{Principal, Role};
