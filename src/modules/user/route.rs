use crate::modules::user::handle::*;
use actix_web::web::ServiceConfig;

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(create_user).service(get_users).service(get_user).service(log_in);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_session_user)
        .service(log_out)
        .service(update_username)
        .service(update_password)
        .service(delete_user);
}
