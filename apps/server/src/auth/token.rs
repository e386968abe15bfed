use rand::Rng;

/// Random bytes behind each token; hex-encoded to twice as many chars
const TOKEN_BYTES: usize = 20;

pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// Generates a new bearer token: 40 lowercase hex characters
pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::rng().random();
    hex::encode(bytes)
}

/// True when `token` has the shape `generate_token` produces
pub fn is_valid_token_format(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Value of an `Authorization: Bearer <token>` header, without the scheme
pub fn parse_bearer_header(header: &str) -> Option<&str> {
    match header.strip_prefix("Bearer ").map(str::trim) {
        Some("") | None => None,
        Some(token) => Some(token),
    }
}
