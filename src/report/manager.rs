use std::path::Path;

use tracing::info;

use crate::database::Database;
use crate::error::Error;

use super::{render_csv, Report, ReportKind};

#[tracing::instrument(skip(db))]
pub async fn generate_report(
    db: &dyn Database,
    kind: ReportKind,
    dir: &Path,
) -> Result<Report, Error> {
    let content = match kind {
        ReportKind::Leads => render_csv(dir, &db.get_leads().await?)?,
        ReportKind::Campaigns => render_csv(dir, &db.get_campaigns().await?)?,
    };

    info!("rendered {} ({} bytes)", kind.file_name(), content.len());

    Ok(Report {
        file_name: kind.file_name(),
        content,
    })
}
