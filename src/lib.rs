use std::sync::Arc;

use actix_web::web::{self, Data, PathConfig, ServiceConfig};
use actix_web::{App, HttpServer, ResponseError};
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod campaign;
pub mod config;
pub mod database;
pub mod error;
pub mod ingest;
pub mod lead;
pub mod metrics;
pub mod notify;
pub mod report;
pub mod seed;
pub mod typedid;

use config::Config;
use database::{Backend, Connector};
use error::Error;
use notify::AlertDispatcher;

/// Registers every endpoint and the shared error formatting.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .service(ingest::endpoints::fetch_data)
    .service(report::endpoints::get_report)
    .service(metrics::endpoints::get_metrics);
}

pub async fn run(config: Config) -> Result<(), Error> {
    let backend = Backend::from_config(&config);
    info!("using {:?} backend", config.backend);

    let connector: Arc<dyn Connector> = Arc::new(backend);
    let alerts = AlertDispatcher::new(notify::from_config(&config.notification));
    let bind_address = config.bind_address.clone();
    let config = Data::new(config);

    info!("listening on {}", bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(Data::from(Arc::clone(&connector)))
            .app_data(Data::new(alerts.clone()))
            .app_data(config.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
            .default_service(web::to(|| async { Error::PathDoesNotExist.error_response() }))
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
