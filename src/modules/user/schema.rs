use serde::{Deserialize, Serialize};

pub const USERNAME_FIELD: &str = "username";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    pub username: String,
    /// Argon2 PHC string, never the plain password.
    pub password: String,
}
