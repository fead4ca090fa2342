use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::campaign::{Campaign, NewCampaign};
use crate::config::{BackendKind, Config};
use crate::error::{DriverError, Error};
use crate::lead::{Lead, NewLead};

pub mod mongo;
pub mod postgres;

pub use mongo::MongoDatabase;
pub use postgres::PostgresDatabase;

/// The storage capabilities every backend provides.
///
/// Reads return every stored record with its id rendered as text, so the
/// records look the same whichever backend produced them.
#[async_trait]
pub trait Database: Send + Sync {
    async fn connect(&self) -> Result<(), Error>;

    async fn disconnect(&self) -> Result<(), Error>;

    async fn insert_lead(&self, lead: NewLead) -> Result<(), Error>;

    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<(), Error>;

    async fn get_leads(&self) -> Result<Vec<Lead>, Error>;

    async fn get_campaigns(&self) -> Result<Vec<Campaign>, Error>;
}

/// Builds a fresh, not yet connected, adapter for each request.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Database>, Error>;
}

/// The backend chosen from configuration at startup.
#[derive(Clone, Debug)]
pub enum Backend {
    Postgres {
        url: String,
        timeout: Duration,
    },
    MongoDb {
        url: String,
        database: String,
        timeout: Duration,
    },
}

impl Backend {
    pub fn from_config(config: &Config) -> Backend {
        match config.backend {
            BackendKind::Postgres => Backend::Postgres {
                url: config.database_url.clone(),
                timeout: config.operation_timeout,
            },
            BackendKind::MongoDb => Backend::MongoDb {
                url: config.database_url.clone(),
                database: config.mongodb_database.clone(),
                timeout: config.operation_timeout,
            },
        }
    }
}

#[async_trait]
impl Connector for Backend {
    async fn open(&self) -> Result<Box<dyn Database>, Error> {
        match self {
            Backend::Postgres { url, timeout } => {
                Ok(Box::new(PostgresDatabase::new(url, *timeout)?))
            }
            Backend::MongoDb {
                url,
                database,
                timeout,
            } => Ok(Box::new(MongoDatabase::new(url, database, *timeout).await?)),
        }
    }
}

/// Opens and connects an adapter. If connecting fails the adapter is
/// disconnected again before the error is returned.
pub async fn connect(connector: &dyn Connector) -> Result<Box<dyn Database>, Error> {
    let db = connector.open().await?;

    if let Err(err) = db.connect().await {
        if let Err(disconnect_err) = db.disconnect().await {
            error!("failed to disconnect after failed connect: {}", disconnect_err);
        }
        return Err(err);
    }

    Ok(db)
}

/// Disconnects the adapter and passes through the outcome of the work done
/// with it. The work's error takes precedence over a disconnect error.
pub async fn release<T>(db: Box<dyn Database>, result: Result<T, Error>) -> Result<T, Error> {
    let disconnected = db.disconnect().await;

    let value = result?;
    disconnected?;

    info!("released database connection");

    Ok(value)
}

pub(crate) async fn bounded<T, E, F>(limit: Duration, operation: F) -> Result<T, DriverError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<DriverError>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(DriverError::TimedOut(limit)),
    }
}
