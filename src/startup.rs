use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    routes::{default_route, lead_route},
    services::LeadOrchestrator,
};

pub fn run(
    listener: TcpListener,
    orchestrator: LeadOrchestrator,
) -> Result<Server, std::io::Error> {
    let orchestrator = web::Data::new(orchestrator);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(default_route::health_check)
            .service(lead_route::generate_leads)
            .app_data(orchestrator.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
