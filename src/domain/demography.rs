//! Mortality grouped into three fixed GDP-per-capita buckets

use crate::domain::mortality::MortalitySample;
use crate::domain::types::{CountryName, GdpPerCapita};
use serde::{Deserialize, Serialize};
use std::fmt;

const LOW_UPPER: f64 = 10_000.0;
const MIDDLE_UPPER: f64 = 30_000.0;

/// Non-overlapping GDP ranges: `[0, 10k)`, `[10k, 30k)`, `[30k, inf)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GdpBucket {
    Low,
    Middle,
    High,
}

impl GdpBucket {
    pub const ALL: [GdpBucket; 3] = [GdpBucket::Low, GdpBucket::Middle, GdpBucket::High];

    pub fn for_gdp(gdp: GdpPerCapita) -> Self {
        let gdp = gdp.into_inner();
        if gdp < LOW_UPPER {
            Self::Low
        } else if gdp < MIDDLE_UPPER {
            Self::Middle
        } else {
            Self::High
        }
    }

    /// Lower bound (inclusive) and upper bound (exclusive, `None` for unbounded)
    pub fn bounds(&self) -> (f64, Option<f64>) {
        match self {
            Self::Low => (0.0, Some(LOW_UPPER)),
            Self::Middle => (LOW_UPPER, Some(MIDDLE_UPPER)),
            Self::High => (MIDDLE_UPPER, None),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "< $10k",
            Self::Middle => "$10k - $30k",
            Self::High => ">= $30k",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Low => 0,
            Self::Middle => 1,
            Self::High => 2,
        }
    }
}

impl fmt::Display for GdpBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Aggregate for one bucket; `mean_deaths_per_100k` is `None` when it has no members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub bucket: GdpBucket,
    pub members: Vec<CountryName>,
    pub mean_deaths_per_100k: Option<f64>,
}

impl BucketSummary {
    fn empty(bucket: GdpBucket) -> Self {
        Self {
            bucket,
            members: Vec::new(),
            mean_deaths_per_100k: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.mean_deaths_per_100k.is_some()
    }

    pub fn display_value(&self) -> String {
        match self.mean_deaths_per_100k {
            Some(mean) => format!("{mean:.2}"),
            None => "no data".to_string(),
        }
    }
}

/// Always exactly three buckets, in [`GdpBucket::ALL`] order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicBreakdown {
    buckets: [BucketSummary; 3],
}

impl DemographicBreakdown {
    /// Partition samples by GDP; samples missing GDP or mortality are left out
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a MortalitySample>) -> Self {
        let mut sums = [0.0_f64; 3];
        let mut buckets = GdpBucket::ALL.map(BucketSummary::empty);

        for sample in samples {
            let (Some(gdp), Some(deaths)) = (sample.gdp_per_capita, sample.deaths_per_100k) else {
                continue;
            };
            let index = GdpBucket::for_gdp(gdp).index();
            sums[index] += deaths.into_inner();
            buckets[index].members.push(sample.country.clone());
        }

        for (summary, sum) in buckets.iter_mut().zip(sums) {
            if !summary.members.is_empty() {
                summary.mean_deaths_per_100k = Some(sum / summary.members.len() as f64);
            }
        }

        Self { buckets }
    }

    pub fn buckets(&self) -> &[BucketSummary; 3] {
        &self.buckets
    }

    pub fn get(&self, bucket: GdpBucket) -> &BucketSummary {
        &self.buckets[bucket.index()]
    }
}
