use tokio::task::JoinHandle;
use tracing::info;

use crate::database::Database;
use crate::error::Error;
use crate::metrics::{aggregate_campaigns, CampaignMetrics};
use crate::notify::{low_conversion_alert, AlertDispatcher};

use super::Batch;

pub struct Ingested {
    pub metrics: CampaignMetrics,
    pub alert: Option<JoinHandle<()>>,
}

/// Stores the batch one record at a time, then alerts if the batch's
/// campaigns convert poorly. The first failed insert aborts the rest and no
/// metrics are computed.
#[tracing::instrument(skip(db, alerts, batch))]
pub async fn ingest(
    db: &dyn Database,
    alerts: &AlertDispatcher,
    batch: Batch,
) -> Result<Ingested, Error> {
    let lead_count = batch.leads.len();
    let campaign_count = batch.campaigns.len();

    for lead in batch.leads {
        db.insert_lead(lead).await?;
    }

    for campaign in &batch.campaigns {
        db.insert_campaign(campaign.clone()).await?;
    }

    info!(
        "stored {} leads and {} campaigns",
        lead_count, campaign_count
    );

    let metrics = aggregate_campaigns(&batch.campaigns);
    let alert = low_conversion_alert(&metrics).map(|alert| alerts.dispatch(alert));

    Ok(Ingested { metrics, alert })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::campaign::{CampaignDate, NewCampaign};
    use crate::database::test::MockDatabase;
    use crate::lead::NewLead;
    use crate::notify::test::RecordingNotifier;

    fn new_campaign(clicks: u64, conversions: u64) -> NewCampaign {
        let now = Utc::now();
        NewCampaign {
            name: "Campaign 0".into(),
            platform: "Facebook".into(),
            budget: 5000.0,
            spend: 2500.0,
            impressions: 50_000,
            clicks,
            conversions,
            start_date: Some(now.into()),
            end_date: Some(now.into()),
        }
    }

    fn new_lead(status: &str) -> NewLead {
        NewLead {
            name: "Lead 0".into(),
            email: "lead0@example.com".into(),
            source: "Website".into(),
            status: status.into(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn low_conversion_sends_exactly_one_alert() {
        let db = MockDatabase::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let alerts = AlertDispatcher::new(notifier.clone());
        let batch = Batch {
            leads: vec![new_lead("New")],
            campaigns: vec![new_campaign(1000, 42)],
        };

        let ingested = ingest(&db, &alerts, batch).await.unwrap();
        ingested.alert.expect("alert was not dispatched").await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("4.2"), "{}", sent[0].body);
        assert_eq!(db.state().leads.lock().unwrap().len(), 1);
        assert_eq!(db.state().campaigns.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn healthy_conversion_sends_nothing() {
        let db = MockDatabase::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let alerts = AlertDispatcher::new(notifier.clone());
        let batch = Batch {
            leads: vec![],
            campaigns: vec![new_campaign(1000, 80)],
        };

        let ingested = ingest(&db, &alerts, batch).await.unwrap();

        assert!(ingested.alert.is_none());
        assert_eq!(ingested.metrics.avg_conversion_rate, 8.0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_date_aborts_the_batch() {
        let db = MockDatabase::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let alerts = AlertDispatcher::new(notifier.clone());
        let batch = Batch {
            leads: vec![new_lead("Converted")],
            campaigns: vec![
                new_campaign(1000, 10),
                NewCampaign {
                    start_date: Some(CampaignDate::Text("31/02/2024".into())),
                    ..new_campaign(1000, 10)
                },
            ],
        };

        let result = ingest(&db, &alerts, batch).await;

        assert!(matches!(
            result,
            Err(Error::InvalidRecord {
                field: "start_date",
                ..
            })
        ));
        assert_eq!(db.state().campaigns.lock().unwrap().len(), 1);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_counter_is_a_validation_error() {
        let db = MockDatabase::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let alerts = AlertDispatcher::new(notifier.clone());
        let batch = Batch {
            leads: vec![],
            campaigns: vec![new_campaign(u64::MAX, 0), new_campaign(1, 0)],
        };

        let result = ingest(&db, &alerts, batch).await;

        assert!(matches!(
            result,
            Err(Error::InvalidRecord {
                field: "clicks",
                ..
            })
        ));
        assert!(db.state().campaigns.lock().unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generated_batch_is_stored() {
        let db = MockDatabase::new();
        let alerts = AlertDispatcher::new(Arc::new(RecordingNotifier::default()));

        let ingested = ingest(&db, &alerts, Batch::generate()).await.unwrap();

        assert_eq!(ingested.metrics.total_campaigns, 5);
        assert_eq!(db.state().leads.lock().unwrap().len(), 10);
        assert_eq!(db.state().campaigns.lock().unwrap().len(), 5);
    }
}
