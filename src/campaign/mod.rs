use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lead::required;
use crate::typedid::{TypedId, TypedIdMarker};

pub type CampaignId = TypedId<Campaign>;

/// A campaign as read back from storage.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub platform: String,
    pub budget: f64,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

/// A date as submitted by a caller, either already a timestamp or text that
/// still needs parsing.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CampaignDate {
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl From<DateTime<Utc>> for CampaignDate {
    fn from(date: DateTime<Utc>) -> CampaignDate {
        CampaignDate::Timestamp(date)
    }
}

/// A campaign as submitted for insertion.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NewCampaign {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub start_date: Option<CampaignDate>,
    #[serde(default)]
    pub end_date: Option<CampaignDate>,
}

/// A campaign that passed validation and can be written by any backend.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignRecord {
    pub name: String,
    pub platform: String,
    pub budget: f64,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl NewCampaign {
    /// Checks required fields and amounts, and parses textual dates.
    ///
    /// Counters must fit in a signed 64-bit integer since that is the widest
    /// integer both backends store.
    pub fn validate(self) -> Result<CampaignRecord, Error> {
        Ok(CampaignRecord {
            name: required("name", self.name)?,
            platform: required("platform", self.platform)?,
            budget: amount("budget", self.budget)?,
            spend: amount("spend", self.spend)?,
            impressions: counter("impressions", self.impressions)?,
            clicks: counter("clicks", self.clicks)?,
            conversions: counter("conversions", self.conversions)?,
            start_date: date("start_date", self.start_date)?,
            end_date: date("end_date", self.end_date)?,
        })
    }
}

impl CampaignRecord {
    pub fn into_campaign(self, id: CampaignId) -> Campaign {
        Campaign {
            id,
            name: self.name,
            platform: self.platform,
            budget: self.budget,
            spend: self.spend,
            impressions: self.impressions,
            clicks: self.clicks,
            conversions: self.conversions,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

fn amount(field: &'static str, value: f64) -> Result<f64, Error> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid_record(
            field,
            format!("{} is not a non-negative amount", value),
        ));
    }

    Ok(value)
}

fn counter(field: &'static str, value: u64) -> Result<u64, Error> {
    if i64::try_from(value).is_err() {
        return Err(Error::invalid_record(
            field,
            format!("{} exceeds the storable range", value),
        ));
    }

    Ok(value)
}

fn date(field: &'static str, value: Option<CampaignDate>) -> Result<DateTime<Utc>, Error> {
    let date = match value {
        Some(CampaignDate::Timestamp(date)) => date,
        Some(CampaignDate::Text(text)) => parse_date(field, &text)?,
        None => return Err(Error::invalid_record(field, "is required")),
    };

    Ok(date.trunc_subsecs(3))
}

/// Accepts RFC 3339, ISO 8601 without an offset (taken as UTC), or a bare
/// `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(field: &'static str, text: &str) -> Result<DateTime<Utc>, Error> {
    let text = text.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date.with_timezone(&Utc));
    }

    for format in &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Utc.from_utc_datetime(&date));
        }
    }

    if let Some(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&date));
    }

    Err(Error::invalid_record(
        field,
        format!("'{}' is not a valid date", text),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_campaign() -> NewCampaign {
        NewCampaign {
            name: "Campaign 0".into(),
            platform: "LinkedIn".into(),
            budget: 5000.0,
            spend: 1200.5,
            impressions: 40_000,
            clicks: 900,
            conversions: 45,
            start_date: Some(CampaignDate::Text("2024-01-10T00:00:00".into())),
            end_date: Some(CampaignDate::Text("2024-02-10".into())),
        }
    }

    #[test]
    fn textual_dates_are_parsed() {
        let record = new_campaign().validate().unwrap();

        assert_eq!(
            record.start_date,
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(
            record.end_date,
            Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let date = parse_date("start_date", "2024-01-10T02:00:00+02:00").unwrap();

        assert_eq!(date, Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn malformed_date_text_is_a_hard_failure() {
        let result = NewCampaign {
            end_date: Some(CampaignDate::Text("next tuesday".into())),
            ..new_campaign()
        }
        .validate();

        assert_eq!(
            result.unwrap_err(),
            Error::invalid_record("end_date", "'next tuesday' is not a valid date")
        );
    }

    #[test]
    fn missing_date_is_rejected() {
        let result = NewCampaign {
            start_date: None,
            ..new_campaign()
        }
        .validate();

        assert_eq!(
            result.unwrap_err(),
            Error::invalid_record("start_date", "is required")
        );
    }

    #[test]
    fn negative_spend_is_rejected() {
        let result = NewCampaign {
            spend: -1.0,
            ..new_campaign()
        }
        .validate();

        assert!(matches!(
            result,
            Err(Error::InvalidRecord { field: "spend", .. })
        ));
    }

    #[test]
    fn dates_deserialize_as_timestamps_or_text() {
        let campaign: NewCampaign = serde_json::from_value(serde_json::json!({
            "name": "Campaign 1",
            "platform": "Twitter",
            "start_date": "2024-01-10T00:00:00Z",
            "end_date": "2024-02-10",
        }))
        .unwrap();

        assert_eq!(
            campaign.start_date,
            Some(CampaignDate::Timestamp(
                Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
            ))
        );
        assert_eq!(
            campaign.end_date,
            Some(CampaignDate::Text("2024-02-10".into()))
        );
    }
}
