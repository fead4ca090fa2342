use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::campaign::NewCampaign;
use crate::lead::NewLead;

pub const DEFAULT_LEAD_COUNT: usize = 10;
pub const DEFAULT_CAMPAIGN_COUNT: usize = 5;

const SOURCES: &[&str] = &["Website", "LinkedIn", "Facebook", "Google"];
const STATUSES: &[&str] = &["New", "Contacted", "Qualified", "Converted"];
const PLATFORMS: &[&str] = &["Facebook", "Google Ads", "LinkedIn", "Twitter"];

fn pick(rng: &mut impl Rng, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

/// Stand-in for leads pulled from a CRM.
pub fn generate_leads(count: usize) -> Vec<NewLead> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    (0..count)
        .map(|i| NewLead {
            name: format!("Lead {}", i),
            email: format!("lead{}@example.com", i),
            source: pick(&mut rng, SOURCES),
            status: pick(&mut rng, STATUSES),
            created_at: Some(now - Duration::days(rng.gen_range(0..=30))),
        })
        .collect()
}

/// Stand-in for campaigns pulled from a marketing platform.
pub fn generate_campaigns(count: usize) -> Vec<NewCampaign> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    (0..count)
        .map(|i| NewCampaign {
            name: format!("Campaign {}", i),
            platform: pick(&mut rng, PLATFORMS),
            budget: rng.gen_range(1000.0..=10000.0),
            spend: rng.gen_range(500.0..=8000.0),
            impressions: rng.gen_range(10_000..=100_000),
            clicks: rng.gen_range(100..=5000),
            conversions: rng.gen_range(10..=500),
            start_date: Some((now - Duration::days(rng.gen_range(10..=60))).into()),
            end_date: Some((now + Duration::days(rng.gen_range(0..=30))).into()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_leads_are_valid() {
        let leads = generate_leads(DEFAULT_LEAD_COUNT);
        let now = Utc::now();

        assert_eq!(leads.len(), 10);
        for (i, lead) in leads.into_iter().enumerate() {
            assert_eq!(lead.email, format!("lead{}@example.com", i));
            assert!(SOURCES.contains(&lead.source.as_str()));
            assert!(STATUSES.contains(&lead.status.as_str()));
            let record = lead.validate(now).unwrap();
            assert!(record.created_at <= now);
            assert!(record.created_at >= now - Duration::days(31));
        }
    }

    #[test]
    fn generated_campaigns_are_valid() {
        let campaigns = generate_campaigns(DEFAULT_CAMPAIGN_COUNT);

        assert_eq!(campaigns.len(), 5);
        for campaign in campaigns {
            assert!(PLATFORMS.contains(&campaign.platform.as_str()));
            assert!((100..=5000).contains(&campaign.clicks));
            assert!((10..=500).contains(&campaign.conversions));
            let record = campaign.validate().unwrap();
            assert!(record.start_date < record.end_date);
        }
    }
}
