use serde::{Deserialize, Serialize};

use crate::campaign::NewCampaign;
use crate::lead::NewLead;
use crate::seed;

pub mod endpoints;
pub mod manager;
pub use endpoints::*;

/// Records submitted together for storage.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Batch {
    #[serde(default)]
    pub leads: Vec<NewLead>,
    #[serde(default)]
    pub campaigns: Vec<NewCampaign>,
}

impl Batch {
    pub fn generate() -> Batch {
        Batch {
            leads: seed::generate_leads(seed::DEFAULT_LEAD_COUNT),
            campaigns: seed::generate_campaigns(seed::DEFAULT_CAMPAIGN_COUNT),
        }
    }
}
