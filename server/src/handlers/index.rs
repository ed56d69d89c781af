use actix_web::Responder;
use askama_actix::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    title: &'static str,
}

pub async fn index() -> impl Responder {
    IndexTemplate {
        title: "Shared Canvas",
    }
}
