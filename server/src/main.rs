use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use clap::Parser;

use canvas_relay_server::config::Config;
use canvas_relay_server::dispatcher::spawn_dispatcher;
use canvas_relay_server::handlers::root;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let bind = config.bind.clone();
    let dispatcher = spawn_dispatcher();

    log::info!("Server started on http://{}", bind);

    // Origins are not checked: any page may open the canvas socket.
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(|cfg| root(cfg, &config, &dispatcher))
    })
    .bind(bind)?
    .run()
    .await?;

    log::info!("Shutting down the server...");
    Ok(())
}
