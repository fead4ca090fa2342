use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, oid::ObjectId};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database as MongoDb};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::campaign::{Campaign, CampaignRecord, NewCampaign};
use crate::error::{DriverError, Error};
use crate::lead::{Lead, LeadRecord, NewLead};

use super::{bounded, Database};

const LEADS: &str = "leads";
const CAMPAIGNS: &str = "campaigns";

#[derive(Clone, Debug, Deserialize, Serialize)]
struct LeadDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
    source: String,
    status: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl LeadDocument {
    fn from_record(record: LeadRecord) -> LeadDocument {
        LeadDocument {
            id: ObjectId::new(),
            name: record.name,
            email: record.email,
            source: record.source,
            status: record.status,
            created_at: record.created_at,
        }
    }

    fn into_lead(self) -> Lead {
        LeadRecord {
            name: self.name,
            email: self.email,
            source: self.source,
            status: self.status,
            created_at: self.created_at,
        }
        .into_lead(self.id.into())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct CampaignDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    platform: String,
    budget: f64,
    spend: f64,
    impressions: i64,
    clicks: i64,
    conversions: i64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    start_date: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    end_date: DateTime<Utc>,
}

impl CampaignDocument {
    // counters were checked against the i64 range during validation
    fn from_record(record: CampaignRecord) -> CampaignDocument {
        CampaignDocument {
            id: ObjectId::new(),
            name: record.name,
            platform: record.platform,
            budget: record.budget,
            spend: record.spend,
            impressions: record.impressions as i64,
            clicks: record.clicks as i64,
            conversions: record.conversions as i64,
            start_date: record.start_date,
            end_date: record.end_date,
        }
    }

    fn into_campaign(self) -> Result<Campaign, DriverError> {
        Ok(CampaignRecord {
            name: self.name,
            platform: self.platform,
            budget: self.budget,
            spend: self.spend,
            impressions: counter("impressions", self.impressions)?,
            clicks: counter("clicks", self.clicks)?,
            conversions: counter("conversions", self.conversions)?,
            start_date: self.start_date,
            end_date: self.end_date,
        }
        .into_campaign(self.id.into()))
    }
}

fn counter(field: &'static str, value: i64) -> Result<u64, DriverError> {
    u64::try_from(value).map_err(|_| DriverError::OutOfRange { field, value })
}

/// Document-store adapter: one collection per record kind.
#[derive(Debug, Clone)]
pub struct MongoDatabase {
    client: Client,
    leads: Collection<LeadDocument>,
    campaigns: Collection<CampaignDocument>,
    db: MongoDb,
    timeout: Duration,
}

impl MongoDatabase {
    pub async fn new(uri: &str, database: &str, timeout: Duration) -> Result<MongoDatabase, Error> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|err| Error::FailedToConnect(err.into()))?;
        options.app_name = Some("ezymetrics".to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options).map_err(|err| Error::FailedToConnect(err.into()))?;
        let db = client.database(database);

        Ok(MongoDatabase {
            leads: db.collection(LEADS),
            campaigns: db.collection(CAMPAIGNS),
            client,
            db,
            timeout,
        })
    }
}

#[async_trait]
impl Database for MongoDatabase {
    #[tracing::instrument(skip(self))]
    async fn connect(&self) -> Result<(), Error> {
        // ping the database to ensure connection is established
        bounded(
            self.timeout,
            self.db.run_command(bson::doc! { "ping": 1 }, None),
        )
        .await
        .map_err(|err| {
            error!("failed to connect to mongodb: {}", err);
            Error::FailedToConnect(err)
        })?;

        info!("connected to mongodb");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn disconnect(&self) -> Result<(), Error> {
        let shutdown = async {
            self.client.clone().shutdown_immediate().await;
            Ok::<(), mongodb::error::Error>(())
        };

        bounded(self.timeout, shutdown).await.map_err(|err| {
            error!("failed to disconnect from mongodb: {}", err);
            Error::FailedToDisconnect(err)
        })?;

        info!("disconnected from mongodb");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn insert_lead(&self, lead: NewLead) -> Result<(), Error> {
        let document = LeadDocument::from_record(lead.validate(Utc::now())?);

        bounded(self.timeout, self.leads.insert_one(&document, None))
            .await
            .map_err(|err| {
                error!("failed to insert lead: {}", err);
                Error::FailedToPersist(err)
            })?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<(), Error> {
        let document = CampaignDocument::from_record(campaign.validate()?);

        bounded(self.timeout, self.campaigns.insert_one(&document, None))
            .await
            .map_err(|err| {
                error!("failed to insert campaign: {}", err);
                Error::FailedToPersist(err)
            })?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_leads(&self) -> Result<Vec<Lead>, Error> {
        let fetch = async {
            let documents: Vec<LeadDocument> = self
                .leads
                .find(bson::doc! {}, None)
                .await?
                .try_collect()
                .await?;
            Ok::<_, mongodb::error::Error>(documents)
        };

        let documents = bounded(self.timeout, fetch).await.map_err(|err| {
            error!("failed to fetch leads: {}", err);
            Error::FailedToRead(err)
        })?;

        Ok(documents.into_iter().map(LeadDocument::into_lead).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let fetch = async {
            let documents: Vec<CampaignDocument> = self
                .campaigns
                .find(bson::doc! {}, None)
                .await?
                .try_collect()
                .await?;
            Ok::<_, mongodb::error::Error>(documents)
        };

        let campaigns = bounded(self.timeout, fetch)
            .await
            .and_then(|documents| {
                documents
                    .into_iter()
                    .map(CampaignDocument::into_campaign)
                    .collect::<Result<Vec<_>, DriverError>>()
            })
            .map_err(|err| {
                error!("failed to fetch campaigns: {}", err);
                Error::FailedToRead(err)
            })?;

        Ok(campaigns)
    }
}
