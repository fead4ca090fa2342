use std::fmt::{Debug, Display};
use std::io::Error as IoError;
use std::time::Duration;

use actix_web::error::PathError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use mongodb::error::Error as MongoError;
use serde::{Serialize, Serializer};
use serde_json::Error as JsonError;
use sqlx::Error as PostgresError;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidBatch(#[derivative(PartialEq = "ignore")] JsonError),
    InvalidReportKind {
        report_kind: String,
    },

    // 404
    PathDoesNotExist,

    // 500
    UnsupportedBackend {
        backend: String,
    },
    InvalidConfiguration {
        variable: &'static str,
        value: String,
    },
    #[serde(serialize_with = "display")]
    FailedToConnect(#[derivative(PartialEq = "ignore")] DriverError),
    #[serde(serialize_with = "display")]
    FailedToDisconnect(#[derivative(PartialEq = "ignore")] DriverError),
    InvalidRecord {
        field: &'static str,
        reason: String,
    },
    #[serde(serialize_with = "display")]
    FailedToPersist(#[derivative(PartialEq = "ignore")] DriverError),
    #[serde(serialize_with = "display")]
    FailedToRead(#[derivative(PartialEq = "ignore")] DriverError),
    #[serde(serialize_with = "display")]
    FailedToWriteReport(#[derivative(PartialEq = "ignore")] csv::Error),
    FailedToSendNotification(String),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidBatch(_) => "E4001004",
            Error::InvalidReportKind { .. } => "E4001005",
            Error::PathDoesNotExist => "E4041000",
            Error::UnsupportedBackend { .. } => "E5001004",
            Error::InvalidConfiguration { .. } => "E5001005",
            Error::FailedToConnect(_) => "E5001006",
            Error::FailedToDisconnect(_) => "E5001007",
            Error::InvalidRecord { .. } => "E5001008",
            Error::FailedToPersist(_) => "E5001009",
            Error::FailedToRead(_) => "E5001010",
            Error::FailedToWriteReport(_) => "E5001011",
            Error::FailedToSendNotification(_) => "E5001012",
            Error::IoError(_) => "E5001003",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidBatch(_) => "The given batch of leads and campaigns could not be parsed",
            Error::InvalidReportKind { .. } => "Invalid report type",
            Error::PathDoesNotExist => "The requested path was not found",
            Error::UnsupportedBackend { .. } => "The configured database type is not supported",
            Error::InvalidConfiguration { .. } => "A configuration value could not be parsed",
            Error::FailedToConnect(_) => "An error occurred when connecting to the database",
            Error::FailedToDisconnect(_) => {
                "An error occurred when disconnecting from the database"
            }
            Error::InvalidRecord { .. } => "The record failed validation",
            Error::FailedToPersist(_) => "An error occurred when writing to the database",
            Error::FailedToRead(_) => "An error occurred when reading from the database",
            Error::FailedToWriteReport(_) => "An error occurred when writing the csv report",
            Error::FailedToSendNotification(_) => "An error occurred when sending a notification",
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }

    pub fn invalid_record(field: &'static str, reason: impl Into<String>) -> Error {
        Error::InvalidRecord {
            field,
            reason: reason.into(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidBatch(_) => StatusCode::BAD_REQUEST,
            Error::InvalidReportKind { .. } => StatusCode::BAD_REQUEST,
            Error::PathDoesNotExist => StatusCode::NOT_FOUND,
            Error::UnsupportedBackend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidConfiguration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToConnect(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToDisconnect(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidRecord { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToPersist(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToWriteReport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSendNotification(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Error {
        Error::FailedToWriteReport(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidPath(err) => Some(err),
            Error::InvalidBatch(err) => Some(err),
            Error::FailedToConnect(err) => Some(err),
            Error::FailedToDisconnect(err) => Some(err),
            Error::FailedToPersist(err) => Some(err),
            Error::FailedToRead(err) => Some(err),
            Error::FailedToWriteReport(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

/// The failure reported by whichever storage driver backs the adapter.
#[derive(Debug)]
pub enum DriverError {
    Mongo(MongoError),
    Postgres(PostgresError),
    TimedOut(Duration),
    OutOfRange { field: &'static str, value: i64 },
}

impl Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            DriverError::Mongo(err) => write!(f, "mongodb: {}", err),
            DriverError::Postgres(err) => write!(f, "postgres: {}", err),
            DriverError::TimedOut(limit) => write!(f, "timed out after {:?}", limit),
            DriverError::OutOfRange { field, value } => {
                write!(f, "stored {} is out of range: {}", field, value)
            }
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Mongo(err) => Some(err),
            DriverError::Postgres(err) => Some(err),
            DriverError::TimedOut(_) => None,
            DriverError::OutOfRange { .. } => None,
        }
    }
}

impl From<MongoError> for DriverError {
    fn from(error: MongoError) -> DriverError {
        DriverError::Mongo(error)
    }
}

impl From<PostgresError> for DriverError {
    fn from(error: PostgresError) -> DriverError {
        DriverError::Postgres(error)
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
