//! Aggregate report types for the dashboard surface.

use crate::order::ServiceCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bucket a service category rolls up into for reporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CategoryBucket {
	Cleaning,
	/// Mechanical faults: not_cold, leaking, noise.
	Repair,
	Other,
}

impl From<ServiceCategory> for CategoryBucket {
	fn from(category: ServiceCategory) -> Self {
		match category {
			ServiceCategory::Cleaning => CategoryBucket::Cleaning,
			ServiceCategory::NotCold | ServiceCategory::Leaking | ServiceCategory::Noise => {
				CategoryBucket::Repair
			},
			ServiceCategory::Other => CategoryBucket::Other,
		}
	}
}

/// Completed-order counts per reporting bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDistribution {
	pub cleaning: u64,
	pub repair: u64,
	pub other: u64,
}

impl CategoryDistribution {
	/// Counts one completed order against its bucket.
	pub fn record(&mut self, bucket: CategoryBucket) {
		match bucket {
			CategoryBucket::Cleaning => self.cleaning += 1,
			CategoryBucket::Repair => self.repair += 1,
			CategoryBucket::Other => self.other += 1,
		}
	}
}

/// Revenue total for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyRevenue {
	/// Calendar month label, `YYYY-MM`.
	pub month: String,
	pub revenue: Decimal,
}

/// Aggregate statistics over completed orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportStats {
	pub total_completed: u64,
	pub total_revenue: Decimal,
	pub current_month_revenue: Decimal,
	pub category_distribution: CategoryDistribution,
	/// Zero-filled lookback window, oldest month first.
	pub revenue_by_month: Vec<MonthlyRevenue>,
}
