use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::typedid::{TypedId, TypedIdMarker};

pub type LeadId = TypedId<Lead>;

pub const STATUS_CONVERTED: &str = "Converted";

/// A lead as read back from storage.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub source: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Lead {
    fn tag() -> &'static str {
        "LEAD"
    }
}

/// A lead as submitted for insertion.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NewLead {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A lead that passed validation and can be written by any backend.
#[derive(Clone, Debug, PartialEq)]
pub struct LeadRecord {
    pub name: String,
    pub email: String,
    pub source: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl NewLead {
    /// Checks required fields and fills `created_at` with `now` when absent.
    ///
    /// Timestamps are truncated to milliseconds, the finest precision every
    /// backend can store.
    pub fn validate(self, now: DateTime<Utc>) -> Result<LeadRecord, Error> {
        Ok(LeadRecord {
            name: required("name", self.name)?,
            email: required("email", self.email)?,
            source: required("source", self.source)?,
            status: required("status", self.status)?,
            created_at: self.created_at.unwrap_or(now).trunc_subsecs(3),
        })
    }
}

impl LeadRecord {
    pub fn into_lead(self, id: LeadId) -> Lead {
        Lead {
            id,
            name: self.name,
            email: self.email,
            source: self.source,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

pub(crate) fn required(field: &'static str, value: String) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid_record(field, "is required"));
    }

    Ok(value)
}
