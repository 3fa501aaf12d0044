use crate::modules::badge::handle::*;
use actix_web::web::ServiceConfig;

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(get_badges);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(give_badge).service(delete_badge);
}
