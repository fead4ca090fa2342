use actix_web::post;
use actix_web::web::{Bytes, Data, Json};
use serde::{Deserialize, Serialize};

use crate::database::{self, Connector};
use crate::error::Error;
use crate::notify::AlertDispatcher;

use super::{manager, Batch};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// An empty body ingests a generated batch; otherwise the body must be a
/// json `Batch`.
#[post("/api/fetch-data")]
#[tracing::instrument(skip(connector, alerts, body), err)]
pub async fn fetch_data(
    connector: Data<dyn Connector>,
    alerts: Data<AlertDispatcher>,
    body: Bytes,
) -> Result<Json<MessageBody>, Error> {
    let batch: Batch = if body.is_empty() {
        Batch::generate()
    } else {
        serde_json::from_slice(&body).map_err(Error::InvalidBatch)?
    };

    let db = database::connect(connector.get_ref()).await?;
    let result = manager::ingest(&*db, &alerts, batch).await;
    database::release(db, result).await?;

    Ok(Json(MessageBody {
        message: "Data fetched and stored successfully".to_string(),
    }))
}
