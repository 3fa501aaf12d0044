use actix_web::{delete, get, patch, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::post::model::{CreatePostModel, PostQuery, PostResponse, UpdatePostModel},
    sync::Synchronizer,
    utils::{ValidatedJson, ValidatedQuery},
};

#[get("/posts")]
pub async fn get_posts(
    sync: web::Data<Synchronizer>,
    query: ValidatedQuery<PostQuery>,
) -> Result<success::Success<Vec<PostResponse>>, error::Error> {
    let posts = sync.get_posts(query.0.author.as_deref()).await?;
    Ok(success::Success::ok(Some(posts)))
}

#[post("/posts")]
pub async fn create_post(
    sync: web::Data<Synchronizer>,
    body: ValidatedJson<CreatePostModel>,
    req: HttpRequest,
) -> Result<success::Success<PostResponse>, error::Error> {
    let actor = get_claims(&req)?.sub;
    let CreatePostModel { content, options } = body.0;
    let post = sync.create_post(actor, &content, options).await?;
    Ok(success::Success::created(Some(post)).message("Post successfully created!"))
}

#[patch("/posts/{id}")]
pub async fn update_post(
    sync: web::Data<Synchronizer>,
    id: web::Path<Uuid>,
    body: ValidatedJson<UpdatePostModel>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_claims(&req)?.sub;
    let UpdatePostModel { content, options } = body.0;
    sync.update_post(actor, id.into_inner(), content, options).await?;
    Ok(success::Success::ok(None).message("Post successfully updated!"))
}

#[delete("/posts/{id}")]
pub async fn delete_post(
    sync: web::Data<Synchronizer>,
    id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_claims(&req)?.sub;
    sync.delete_post(actor, id.into_inner()).await?;
    Ok(success::Success::ok(None).message("Deleted post!"))
}
