//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify HS256 access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 3600 = 1 hour).
    pub access_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length for registration and password changes.
    pub min_password_length: usize,
    /// Random bytes in a generated temporary password (hex-encoded, so
    /// the password is twice as many characters).
    pub temporary_password_bytes: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_lifetime_secs: 3600,
            jwt_issuer: "rollcall".into(),
            pepper: None,
            min_password_length: 8,
            temporary_password_bytes: 8,
        }
    }
}
