use actix_web::get;
use actix_web::web::{Data, Json};

use crate::database::{self, Connector};
use crate::error::Error;

use super::manager::{self, Metrics};

#[get("/api/metrics")]
#[tracing::instrument(skip(connector), err)]
pub async fn get_metrics(connector: Data<dyn Connector>) -> Result<Json<Metrics>, Error> {
    let db = database::connect(connector.get_ref()).await?;
    let result = manager::get_metrics(&*db).await;
    let metrics = database::release(db, result).await?;

    Ok(Json(metrics))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    use super::*;
    use crate::database::test::MockConnector;

    #[actix_web::test]
    async fn returns_both_aggregates() {
        let connector = MockConnector::new();
        let app = test::init_service(
            App::new()
                .app_data(Data::from(Arc::new(connector.clone()) as Arc<dyn Connector>))
                .service(get_metrics),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/metrics").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["lead_metrics"]["total_leads"], 0);
        assert_eq!(body["lead_metrics"]["leads_by_source"], serde_json::json!({}));
        assert_eq!(body["campaign_metrics"]["avg_ctr"], 0.0);
    }

    #[actix_web::test]
    async fn read_failure_is_a_server_error() {
        let connector = MockConnector::new();
        connector.state().fail_reads.store(true, Ordering::SeqCst);
        let app = test::init_service(
            App::new()
                .app_data(Data::from(Arc::new(connector.clone()) as Arc<dyn Connector>))
                .service(get_metrics),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/metrics").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error_code"], "E5001010");
        assert_eq!(connector.state().disconnects.load(Ordering::SeqCst), 1);
    }
}
