pub mod extractor;
pub mod jwt;

pub use extractor::{AuthedUser, MaybeUser};
pub use jwt::JwtService;
