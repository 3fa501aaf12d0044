use actix_web::{delete, get, put, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::badge::model::{BadgeQuery, BadgeResponse, GiveBadgeModel},
    sync::Synchronizer,
    utils::{ValidatedJson, ValidatedQuery},
};

#[get("/badges")]
pub async fn get_badges(
    sync: web::Data<Synchronizer>,
    query: ValidatedQuery<BadgeQuery>,
) -> Result<success::Success<Vec<BadgeResponse>>, error::Error> {
    let badges = sync.get_badges(&query.0.author).await?;
    Ok(success::Success::ok(Some(badges)))
}

#[put("/badges")]
pub async fn give_badge(
    sync: web::Data<Synchronizer>,
    body: ValidatedJson<GiveBadgeModel>,
    req: HttpRequest,
) -> Result<success::Success<BadgeResponse>, error::Error> {
    let actor = get_claims(&req)?.sub;
    let badge = sync.give_badge(actor, body.0.kind).await?;
    Ok(success::Success::created(Some(badge)).message("Badge given!"))
}

#[delete("/badges/{id}")]
pub async fn delete_badge(
    sync: web::Data<Synchronizer>,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    sync.delete_badge(id.into_inner()).await?;
    Ok(success::Success::ok(None).message("Badge removed!"))
}
