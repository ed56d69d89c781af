use actix_files::Files;
use actix_web::web;

use crate::config::Config;
use crate::connection::ws_index;
use crate::dispatcher::DispatcherHandle;
use crate::handlers::index::index;

mod index;

pub fn root(cfg: &mut web::ServiceConfig, config: &Config, dispatcher: &DispatcherHandle) {
    cfg.app_data(web::Data::new(dispatcher.clone()))
        .app_data(web::Data::new(config.clone()))
        .service(web::resource("/ws").route(web::get().to(ws_index)))
        .service(Files::new("/static", config.static_dir.clone()))
        .service(web::resource("/").route(web::get().to(index)));
}
