mod common;

use actix_web::{test, App};

use canvas_relay_server::dispatcher::spawn_dispatcher;
use canvas_relay_server::handlers::root;
use common::test_config;

#[actix_web::test]
async fn it_renders_the_landing_page() {
    let config = test_config();
    let dispatcher = spawn_dispatcher();
    let app = test::init_service(App::new().configure(|cfg| root(cfg, &config, &dispatcher))).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    let body = std::str::from_utf8(&body).expect("utf-8 body");
    assert!(body.contains(r#"<canvas id="canvas""#));
    assert!(body.contains("/static/js/script.js"));
}

#[actix_web::test]
async fn it_serves_client_assets() {
    let config = test_config();
    let dispatcher = spawn_dispatcher();
    let app = test::init_service(App::new().configure(|cfg| root(cfg, &config, &dispatcher))).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/static/js/script.js").to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/static/js/missing.js").to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 404);
}
