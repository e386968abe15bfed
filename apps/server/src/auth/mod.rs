pub mod extractors;
pub mod token;

pub use extractors::BearerAuth;
pub use token::{generate_token, is_valid_token_format, parse_bearer_header, TOKEN_LEN};
