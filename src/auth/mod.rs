mod jwt;

// Re-export for use in extractors
pub use jwt::{decode_token, TokenClaims};
