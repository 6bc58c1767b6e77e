use actix_web::{get, HttpResponse, Responder};
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {}

#[get("/")]
pub async fn default() -> HttpResponse {
    match (IndexTemplate {}).render() {
        Ok(page) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(page),
        Err(e) => {
            log::error!("Failed to render index template: {:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/health_check")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}
