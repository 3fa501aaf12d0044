use actix_web::{delete, get, post, put, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::relationship::model::FriendRequestResponse,
    sync::Synchronizer,
};

#[get("")]
pub async fn list_friends(
    sync: web::Data<Synchronizer>,
    req: HttpRequest,
) -> Result<success::Success<Vec<String>>, error::Error> {
    let actor = get_claims(&req)?.sub;
    let friends = sync.get_friends(actor).await?;
    Ok(success::Success::ok(Some(friends)))
}

#[delete("/{friend}")]
pub async fn remove_friend(
    sync: web::Data<Synchronizer>,
    friend: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_claims(&req)?.sub;
    sync.remove_friend(actor, &friend).await?;
    Ok(success::Success::ok(None).message("Unfriended!"))
}

#[get("/requests")]
pub async fn list_friend_requests(
    sync: web::Data<Synchronizer>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let actor = get_claims(&req)?.sub;
    let requests = sync.get_friend_requests(actor).await?;
    Ok(success::Success::ok(Some(requests)))
}

#[post("/requests/{to}")]
pub async fn send_friend_request(
    sync: web::Data<Synchronizer>,
    to: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestResponse>, error::Error> {
    let actor = get_claims(&req)?.sub;
    let request = sync.send_friend_request(actor, &to).await?;
    Ok(success::Success::created(Some(request)).message("Sent request!"))
}

#[delete("/requests/{to}")]
pub async fn remove_friend_request(
    sync: web::Data<Synchronizer>,
    to: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_claims(&req)?.sub;
    sync.remove_friend_request(actor, &to).await?;
    Ok(success::Success::ok(None).message("Removed request!"))
}

#[put("/accept/{from}")]
pub async fn accept_friend_request(
    sync: web::Data<Synchronizer>,
    from: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_claims(&req)?.sub;
    sync.accept_friend_request(actor, &from).await?;
    Ok(success::Success::ok(None).message("Accepted request!"))
}

#[put("/reject/{from}")]
pub async fn reject_friend_request(
    sync: web::Data<Synchronizer>,
    from: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_claims(&req)?.sub;
    sync.reject_friend_request(actor, &from).await?;
    Ok(success::Success::ok(None).message("Rejected request!"))
}
