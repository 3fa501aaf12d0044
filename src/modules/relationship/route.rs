use crate::modules::relationship::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/friends").service(list_friends).service(remove_friend)).service(
        scope("/friend")
            .service(list_friend_requests)
            .service(send_friend_request)
            .service(remove_friend_request)
            .service(accept_friend_request)
            .service(reject_friend_request),
    );
}
