use crate::modules::report::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/reports").service(list_reports).service(create_report).service(address_report),
    );
}
