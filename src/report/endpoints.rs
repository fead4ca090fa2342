use actix_web::get;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{Data, Path};
use actix_web::HttpResponse;

use crate::config::Config;
use crate::database::{self, Connector};
use crate::error::Error;

use super::{manager, ReportKind};

#[get("/api/reports/{report_type}")]
#[tracing::instrument(skip(connector, config), err)]
pub async fn get_report(
    connector: Data<dyn Connector>,
    config: Data<Config>,
    params: Path<String>,
) -> Result<HttpResponse, Error> {
    let kind: ReportKind = params.into_inner().parse()?;

    let db = database::connect(connector.get_ref()).await?;
    let result = manager::generate_report(&*db, kind, &config.report_dir).await;
    let report = database::release(db, result).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(report.file_name.to_string())],
        })
        .body(report.content))
}
