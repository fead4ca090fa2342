use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::config::NotificationConfig;
use crate::error::Error;
use crate::metrics::CampaignMetrics;

pub mod smtp;

pub use smtp::SmtpNotifier;

pub const LOW_CONVERSION_THRESHOLD: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

/// Returns an alert when the campaigns converted below the threshold.
pub fn low_conversion_alert(metrics: &CampaignMetrics) -> Option<Alert> {
    if metrics.avg_conversion_rate >= LOW_CONVERSION_THRESHOLD {
        return None;
    }

    Some(Alert {
        subject: "Low Conversion Rate Alert".to_string(),
        body: format!(
            "Campaign conversion rate has dropped below {}%: {:.2}%",
            LOW_CONVERSION_THRESHOLD, metrics.avg_conversion_rate
        ),
    })
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), Error>;
}

/// Stands in when the email settings are incomplete.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), Error> {
        warn!(
            "missing email configuration, dropping alert: {}",
            alert.subject
        );

        Ok(())
    }
}

pub fn from_config(config: &NotificationConfig) -> Arc<dyn Notifier> {
    match SmtpNotifier::from_config(config) {
        Ok(Some(notifier)) => Arc::new(notifier),
        Ok(None) => {
            warn!("missing email configuration, alerts are disabled");
            Arc::new(DisabledNotifier)
        }
        Err(err) => {
            warn!("invalid email configuration, alerts are disabled: {}", err);
            Arc::new(DisabledNotifier)
        }
    }
}

/// Sends alerts off the request path. Failures are logged and never reach
/// the caller.
#[derive(Clone)]
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl AlertDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> AlertDispatcher {
        AlertDispatcher { notifier }
    }

    pub fn dispatch(&self, alert: Alert) -> JoinHandle<()> {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(err) = notifier.send(&alert).await {
                error!("failed to send email alert: {}", err);
            }
        })
    }
}
