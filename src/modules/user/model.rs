use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{modules::user::schema::UserDoc, store::Document};

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateUsernameModel {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordModel {
    pub current_password: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub new_password: String,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub username: String,
    pub date_created: chrono::DateTime<chrono::Utc>,
}

impl From<Document<UserDoc>> for UserResponse {
    fn from(doc: Document<UserDoc>) -> Self {
        UserResponse { id: doc.id, username: doc.fields.username, date_created: doc.date_created }
    }
}
