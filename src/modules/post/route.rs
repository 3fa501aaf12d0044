use crate::modules::post::handle::*;
use actix_web::web::ServiceConfig;

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(get_posts);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(create_post).service(update_post).service(delete_post);
}
