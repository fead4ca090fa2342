use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::campaign::Campaign;
use crate::error::Error;
use crate::lead::Lead;

pub mod endpoints;
pub mod manager;
pub use endpoints::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReportKind {
    Leads,
    Campaigns,
}

impl ReportKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ReportKind::Leads => "leads_report.csv",
            ReportKind::Campaigns => "campaigns_report.csv",
        }
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leads" => Ok(ReportKind::Leads),
            "campaigns" => Ok(ReportKind::Campaigns),
            other => Err(Error::InvalidReportKind {
                report_kind: other.to_string(),
            }),
        }
    }
}

/// A record type that can be written as one csv row. `COLUMNS` must list the
/// serialized fields in declaration order.
pub trait ReportRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

impl ReportRow for Lead {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "email", "source", "status", "created_at"];
}

impl ReportRow for Campaign {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "platform",
        "budget",
        "spend",
        "impressions",
        "clicks",
        "conversions",
        "start_date",
        "end_date",
    ];
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub file_name: &'static str,
    pub content: Vec<u8>,
}

/// Writes the rows to a temporary file under `dir` and returns its contents.
/// The file is removed when this returns, whether or not writing succeeded.
pub fn render_csv<R: ReportRow>(dir: &Path, rows: &[R]) -> Result<Vec<u8>, Error> {
    let mut file = tempfile::Builder::new()
        .prefix("report-")
        .suffix(".csv")
        .tempfile_in(dir)?;

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file.as_file_mut());
        writer.write_record(R::COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }

    let mut content = Vec::new();
    file.as_file_mut().seek(SeekFrom::Start(0))?;
    file.as_file_mut().read_to_end(&mut content)?;

    Ok(content)
}
