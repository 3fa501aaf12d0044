use actix_web::{delete, get, patch, post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::user::model,
    sync::Synchronizer,
    utils::ValidatedJson,
};

#[get("/session")]
pub async fn get_session_user(
    sync: web::Data<Synchronizer>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let actor = get_claims(&req)?.sub;
    let user = sync.session_user(actor).await?;
    Ok(success::Success::ok(Some(user)))
}

#[get("/users")]
pub async fn get_users(
    sync: web::Data<Synchronizer>,
) -> Result<success::Success<Vec<model::UserResponse>>, error::Error> {
    let users = sync.get_users().await?;
    Ok(success::Success::ok(Some(users)))
}

#[get("/users/{username}")]
pub async fn get_user(
    sync: web::Data<Synchronizer>,
    username: web::Path<String>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = sync.get_user(&username).await?;
    Ok(success::Success::ok(Some(user)))
}

#[post("/users")]
pub async fn create_user(
    sync: web::Data<Synchronizer>,
    user_data: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = sync.create_user(&user_data.0.username, &user_data.0.password).await?;
    Ok(success::Success::created(Some(user)).message("Created a new user!"))
}

#[post("/login")]
pub async fn log_in(
    sync: web::Data<Synchronizer>,
    user_data: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let access_token = sync.log_in(&user_data.0.username, &user_data.0.password).await?;
    Ok(success::Success::ok(Some(model::SignInResponse { access_token }))
        .message("Logged in!"))
}

#[post("/logout")]
pub async fn log_out(
    sync: web::Data<Synchronizer>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let session = get_claims(&req)?.sid;
    sync.log_out(session).await?;
    Ok(success::Success::ok(None).message("Logged out!"))
}

#[patch("/users/username")]
pub async fn update_username(
    sync: web::Data<Synchronizer>,
    user_data: ValidatedJson<model::UpdateUsernameModel>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_claims(&req)?.sub;
    sync.update_username(actor, &user_data.0.username).await?;
    Ok(success::Success::ok(None).message("Username updated successfully!"))
}

#[patch("/users/password")]
pub async fn update_password(
    sync: web::Data<Synchronizer>,
    user_data: ValidatedJson<model::UpdatePasswordModel>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_claims(&req)?.sub;
    let model::UpdatePasswordModel { current_password, new_password } = user_data.0;
    sync.update_password(actor, &current_password, &new_password).await?;
    Ok(success::Success::ok(None).message("Password updated successfully!"))
}

#[delete("/users")]
pub async fn delete_user(
    sync: web::Data<Synchronizer>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let actor = get_claims(&req)?.sub;
    sync.delete_user(actor).await?;
    Ok(success::Success::no_content())
}
