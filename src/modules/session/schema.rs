use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const USER_FIELD: &str = "user";

/// A signed-in session. The document id is the `sid` carried by the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDoc {
    pub user: Uuid,
}
