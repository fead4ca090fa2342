use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;

use super::{aggregate_campaigns, aggregate_leads, CampaignMetrics, LeadMetrics};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Metrics {
    pub lead_metrics: LeadMetrics,
    pub campaign_metrics: CampaignMetrics,
}

#[tracing::instrument(skip(db))]
pub async fn get_metrics(db: &dyn Database) -> Result<Metrics, Error> {
    let leads = db.get_leads().await?;
    let campaigns = db.get_campaigns().await?;

    Ok(Metrics {
        lead_metrics: aggregate_leads(&leads),
        campaign_metrics: aggregate_campaigns(&campaigns),
    })
}
