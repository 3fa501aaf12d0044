use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};

use crate::{api::error, sync::Synchronizer, utils::Claims};

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            return Err(error::Error::unauthorized("Must be logged in!").into());
        }
    };

    let sync = req
        .app_data::<web::Data<Synchronizer>>()
        .cloned()
        .ok_or(error::Error::InternalServer)?;
    let claims = sync.verify_session(token).await.map_err(|err| match err {
        error::SystemError::JwtError(_) | error::SystemError::Concept(_) => {
            error::Error::forbidden("Token Invalid or Expired")
        }
        other => error::Error::from(other),
    })?;

    req.extensions_mut().insert(claims);

    next.call(req).await
}

pub fn get_claims(req: &HttpRequest) -> Result<Claims, error::Error> {
    let extensions = req.extensions();

    let claims = extensions
        .get::<Claims>()
        .ok_or_else(|| error::Error::unauthorized("Must be logged in!"))?
        .clone();

    Ok(claims)
}
