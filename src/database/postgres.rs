use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{error, info};

use crate::campaign::{Campaign, CampaignRecord, NewCampaign};
use crate::error::{DriverError, Error};
use crate::lead::{Lead, LeadRecord, NewLead};

use super::{bounded, Database};

const CREATE_LEADS: &str = r#"
    CREATE TABLE IF NOT EXISTS leads (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        source TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_CAMPAIGNS: &str = r#"
    CREATE TABLE IF NOT EXISTS campaigns (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        platform TEXT NOT NULL,
        budget DOUBLE PRECISION NOT NULL CHECK (budget >= 0),
        spend DOUBLE PRECISION NOT NULL CHECK (spend >= 0),
        impressions BIGINT NOT NULL CHECK (impressions >= 0),
        clicks BIGINT NOT NULL CHECK (clicks >= 0),
        conversions BIGINT NOT NULL CHECK (conversions >= 0),
        start_date TIMESTAMPTZ NOT NULL,
        end_date TIMESTAMPTZ NOT NULL
    )
"#;

#[derive(Debug, FromRow)]
struct LeadRow {
    id: i64,
    name: String,
    email: String,
    source: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Lead {
        LeadRecord {
            name: row.name,
            email: row.email,
            source: row.source,
            status: row.status,
            created_at: row.created_at,
        }
        .into_lead(row.id.into())
    }
}

#[derive(Debug, FromRow)]
struct CampaignRow {
    id: i64,
    name: String,
    platform: String,
    budget: f64,
    spend: f64,
    impressions: i64,
    clicks: i64,
    conversions: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = sqlx::Error;

    fn try_from(row: CampaignRow) -> Result<Campaign, sqlx::Error> {
        Ok(CampaignRecord {
            name: row.name,
            platform: row.platform,
            budget: row.budget,
            spend: row.spend,
            impressions: decode_counter(row.impressions)?,
            clicks: decode_counter(row.clicks)?,
            conversions: decode_counter(row.conversions)?,
            start_date: row.start_date,
            end_date: row.end_date,
        }
        .into_campaign(row.id.into()))
    }
}

fn decode_counter(value: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

fn encode_counter(value: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|err| sqlx::Error::Encode(Box::new(err)))
}

/// Relational adapter: one table per record kind with a serial primary key.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresDatabase {
    /// Prepares a pool without opening any connection; `connect` does that.
    pub fn new(url: &str, timeout: Duration) -> Result<PostgresDatabase, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(timeout)
            .connect_lazy(url)
            .map_err(|err| Error::FailedToConnect(err.into()))?;

        Ok(PostgresDatabase { pool, timeout })
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    #[tracing::instrument(skip(self))]
    async fn connect(&self) -> Result<(), Error> {
        let provision = async {
            sqlx::query(CREATE_LEADS).execute(&self.pool).await?;
            sqlx::query(CREATE_CAMPAIGNS).execute(&self.pool).await?;
            Ok::<(), sqlx::Error>(())
        };

        bounded(self.timeout, provision).await.map_err(|err| {
            error!("failed to connect to postgres: {}", err);
            Error::FailedToConnect(err)
        })?;

        info!("connected to postgres");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn disconnect(&self) -> Result<(), Error> {
        if tokio::time::timeout(self.timeout, self.pool.close())
            .await
            .is_err()
        {
            error!("failed to disconnect from postgres within {:?}", self.timeout);
            return Err(Error::FailedToDisconnect(DriverError::TimedOut(
                self.timeout,
            )));
        }

        info!("disconnected from postgres");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn insert_lead(&self, lead: NewLead) -> Result<(), Error> {
        let record = lead.validate(Utc::now())?;

        // the transaction rolls back on drop unless committed
        let insert = async {
            let mut tx = self.pool.begin().await?;
            sqlx::query(
                "INSERT INTO leads (name, email, source, status, created_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&record.name)
            .bind(&record.email)
            .bind(&record.source)
            .bind(&record.status)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;
            tx.commit().await
        };

        bounded(self.timeout, insert).await.map_err(|err| {
            error!("failed to insert lead: {}", err);
            Error::FailedToPersist(err)
        })?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<(), Error> {
        let record = campaign.validate()?;

        let insert = async {
            let mut tx = self.pool.begin().await?;
            sqlx::query(
                "INSERT INTO campaigns \
                 (name, platform, budget, spend, impressions, clicks, conversions, start_date, end_date) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(&record.name)
            .bind(&record.platform)
            .bind(record.budget)
            .bind(record.spend)
            .bind(encode_counter(record.impressions)?)
            .bind(encode_counter(record.clicks)?)
            .bind(encode_counter(record.conversions)?)
            .bind(record.start_date)
            .bind(record.end_date)
            .execute(&mut *tx)
            .await?;
            tx.commit().await
        };

        bounded(self.timeout, insert).await.map_err(|err| {
            error!("failed to insert campaign: {}", err);
            Error::FailedToPersist(err)
        })?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_leads(&self) -> Result<Vec<Lead>, Error> {
        let rows = bounded(
            self.timeout,
            sqlx::query_as::<_, LeadRow>(
                "SELECT id, name, email, source, status, created_at FROM leads",
            )
            .fetch_all(&self.pool),
        )
        .await
        .map_err(|err| {
            error!("failed to fetch leads: {}", err);
            Error::FailedToRead(err)
        })?;

        Ok(rows.into_iter().map(Lead::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let fetch = async {
            let rows = sqlx::query_as::<_, CampaignRow>(
                "SELECT id, name, platform, budget, spend, impressions, clicks, conversions, \
                 start_date, end_date FROM campaigns",
            )
            .fetch_all(&self.pool)
            .await?;
            rows.into_iter()
                .map(Campaign::try_from)
                .collect::<Result<Vec<_>, sqlx::Error>>()
        };

        let campaigns = bounded(self.timeout, fetch).await.map_err(|err| {
            error!("failed to fetch campaigns: {}", err);
            Error::FailedToRead(err)
        })?;

        Ok(campaigns)
    }
}
