use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::borrow::Cow;
use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error(transparent)]
    Concept(ConceptError),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Error::BadRequest(_) => "BadRequest",
            Error::Unauthorized(_) => "Unauthorized",
            Error::Forbidden(_) => "Forbidden",
            Error::Conflict(_) => "AlreadyExistsError",
            Error::Concept(err) => err.kind(),
            Error::InternalServer => "InternalServerError",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Concept(err) => err.status_code(),
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Error::Conflict(msg)
            | Error::Unauthorized(msg)
            | Error::BadRequest(msg)
            | Error::Forbidden(msg) => msg.clone(),
            Error::Concept(err) => err.to_string().into(),
            // Never leak internals
            Error::InternalServer => "Internal Server Error".into(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody { error: self.kind(), message })
    }
}

/// Domain failures raised by concepts. Stores never produce these.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConceptError {
    #[error("{0}")]
    NotFound(Cow<'static, str>),
    #[error("{0}")]
    AlreadyExists(Cow<'static, str>),
    #[error("Friend request between {0} and {1} already exists!")]
    DuplicateRequest(Uuid, Uuid),
    #[error("{0} and {1} are already friends!")]
    AlreadyFriends(Uuid, Uuid),
    #[error("{0}")]
    SelfReference(Cow<'static, str>),
    #[error("{0}")]
    NotAllowed(Cow<'static, str>),
}

impl ConceptError {
    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn self_reference(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::SelfReference(msg.into())
    }

    pub fn not_allowed(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotAllowed(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConceptError::NotFound(_) => "NotFoundError",
            ConceptError::AlreadyExists(_) => "AlreadyExistsError",
            ConceptError::DuplicateRequest(..) => "DuplicateRequestError",
            ConceptError::AlreadyFriends(..) => "AlreadyFriendsError",
            ConceptError::SelfReference(_) => "SelfReferenceError",
            ConceptError::NotAllowed(_) => "NotAllowedError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ConceptError::NotFound(_) => StatusCode::NOT_FOUND,
            ConceptError::AlreadyExists(_)
            | ConceptError::DuplicateRequest(..)
            | ConceptError::AlreadyFriends(..) => StatusCode::CONFLICT,
            ConceptError::SelfReference(_) => StatusCode::BAD_REQUEST,
            ConceptError::NotAllowed(_) => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // jwt errors
    #[error("JWT Error")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    // argon2 errors
    #[error("Hash Error")]
    HashError(#[from] argon2::password_hash::Error),
    // sqlx errors
    #[error("Database Error : {0}")]
    DatabaseError(Cow<'static, str>),
    #[error("Migration Error")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    // serde errors
    #[error("JSON Serialization/Deserialization Error")]
    JsonError(#[from] serde_json::Error),
    // domain errors
    #[error(transparent)]
    Concept(#[from] ConceptError),
    // Custom Errors
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Store Conflict: {0:?}")]
    Conflict(Option<DbErrorMeta>),
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

fn conflict_message(meta: &Option<DbErrorMeta>) -> Cow<'static, str> {
    let Some(m) = meta else {
        return "Duplicate value".into();
    };

    let Some(constraint) = &m.constraint else {
        return "Duplicate value".into();
    };

    let field = constraint.split('_').next_back().unwrap_or("value");

    let mut chars = field.chars();
    let field = match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Value".to_string(),
    };

    format!("{field} already exists").into()
}

#[derive(Debug, Clone)]
pub struct DbErrorMeta {
    pub code: Option<String>,
    pub constraint: Option<String>,
    pub message: String,
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::Concept(err) => Error::Concept(err),
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::Conflict(meta) => Error::Conflict(conflict_message(&meta)),
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

impl From<ConceptError> for Error {
    fn from(value: ConceptError) -> Self {
        Error::Concept(value)
    }
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    log::warn!("Unique constraint violated: {:?}", db_err.constraint());
                    return SystemError::Conflict(Some(DbErrorMeta {
                        code: db_err.code().map(|s| s.to_string()),
                        constraint: db_err.constraint().map(|s| s.to_string()),
                        message: db_err.message().to_string(),
                    }));
                }
                _ => {
                    log::error!("Unhandled DB error: {:?}", db_err);
                    return SystemError::DatabaseError(db_err.message().to_string().into());
                }
            }
        }
        log::error!("{:?}", err);
        SystemError::InternalError(Box::new(err))
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SystemError::Conflict(_))
    }

    pub fn concept(&self) -> Option<&ConceptError> {
        match self {
            SystemError::Concept(err) => Some(err),
            _ => None,
        }
    }
}
