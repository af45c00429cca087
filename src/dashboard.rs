use serde::Serialize;

use crate::chart::ChartSeries;
use crate::error::Result;
use crate::feed::RawFeedResponse;
use crate::stats::StatsSummary;

/// Everything the results view shows for one response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: StatsSummary,
    pub series: ChartSeries,
}

impl Dashboard {
    #[tracing::instrument(skip_all, fields(element_count = feed.element_count))]
    pub fn from_feed(feed: &RawFeedResponse) -> Result<Self> {
        Ok(Self {
            summary: StatsSummary::from_feed(feed)?,
            series: ChartSeries::from_objects(&feed.near_earth_objects),
        })
    }
}
