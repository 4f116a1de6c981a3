use chrono::NaiveDateTime;

/// Login credentials for a student. Never serialized to clients.
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    /// `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>`
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}
