use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::campaign::{Campaign, NewCampaign};
use crate::lead::{Lead, STATUS_CONVERTED};

pub mod endpoints;
pub mod manager;
pub use endpoints::*;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LeadMetrics {
    pub total_leads: u64,
    pub leads_by_source: BTreeMap<String, u64>,
    pub leads_by_status: BTreeMap<String, u64>,
    pub conversion_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CampaignMetrics {
    pub total_campaigns: u64,
    pub total_spend: f64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub avg_conversion_rate: f64,
    pub avg_ctr: f64,
    pub avg_cpc: f64,
}

/// The performance counters the campaign aggregate is computed from.
pub trait CampaignPerformance {
    fn spend(&self) -> f64;
    fn impressions(&self) -> u64;
    fn clicks(&self) -> u64;
    fn conversions(&self) -> u64;
}

impl CampaignPerformance for Campaign {
    fn spend(&self) -> f64 {
        self.spend
    }

    fn impressions(&self) -> u64 {
        self.impressions
    }

    fn clicks(&self) -> u64 {
        self.clicks
    }

    fn conversions(&self) -> u64 {
        self.conversions
    }
}

impl CampaignPerformance for NewCampaign {
    fn spend(&self) -> f64 {
        self.spend
    }

    fn impressions(&self) -> u64 {
        self.impressions
    }

    fn clicks(&self) -> u64 {
        self.clicks
    }

    fn conversions(&self) -> u64 {
        self.conversions
    }
}

pub fn aggregate_leads(leads: &[Lead]) -> LeadMetrics {
    let mut leads_by_source = BTreeMap::new();
    let mut leads_by_status = BTreeMap::new();
    let mut converted = 0u64;

    for lead in leads {
        *leads_by_source.entry(lead.source.clone()).or_insert(0) += 1;
        *leads_by_status.entry(lead.status.clone()).or_insert(0) += 1;

        if lead.status == STATUS_CONVERTED {
            converted += 1;
        }
    }

    let total_leads = leads.len() as u64;

    LeadMetrics {
        total_leads,
        leads_by_source,
        leads_by_status,
        conversion_rate: percentage(converted, total_leads),
    }
}

pub fn aggregate_campaigns<C: CampaignPerformance>(campaigns: &[C]) -> CampaignMetrics {
    // summed in sorted order so the float total does not depend on input order
    let mut spends: Vec<f64> = campaigns.iter().map(CampaignPerformance::spend).collect();
    spends.sort_by(f64::total_cmp);
    let total_spend: f64 = spends.into_iter().sum();

    let total_impressions = saturating_total(campaigns, C::impressions);
    let total_clicks = saturating_total(campaigns, C::clicks);
    let total_conversions = saturating_total(campaigns, C::conversions);

    // a zero clicks total zeroes both click-based ratios, whatever the spend
    let avg_cpc = if total_clicks > 0 {
        total_spend / total_clicks as f64
    } else {
        0.0
    };

    CampaignMetrics {
        total_campaigns: campaigns.len() as u64,
        total_spend,
        total_impressions,
        total_clicks,
        total_conversions,
        avg_conversion_rate: percentage(total_conversions, total_clicks),
        avg_ctr: percentage(total_clicks, total_impressions),
        avg_cpc,
    }
}

// counters stop at u64::MAX instead of overflowing
fn saturating_total<C>(campaigns: &[C], counter: impl Fn(&C) -> u64) -> u64 {
    campaigns
        .iter()
        .fold(0u64, |total, campaign| total.saturating_add(counter(campaign)))
}

fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }

    numerator as f64 / denominator as f64 * 100.0
}
