//! Service order persistence and role-scoped queries.
//!
//! Orders are stored under the `orders` namespace keyed by their id. The
//! guarded update path carries the snapshot the caller read, so concurrent
//! transitions surface as `Conflict` instead of overwriting each other.
//! Aggregate statistics for the reporting surface live here too, since
//! they are queries over the same namespace.

use chrono::{DateTime, Datelike, Utc};
use fixline_storage::{StorageError, StorageService};
use fixline_types::{
	Actor, CategoryBucket, CategoryDistribution, MonthlyRevenue, OrderStatus, ReportStats, Role,
	ServiceOrder, StorageKey,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Whether an actor's role grants read access to an order.
///
/// Admins and owners see everything; technicians see their assignments;
/// tenants see the orders they reported.
pub fn visible_to(actor: &Actor, order: &ServiceOrder) -> bool {
	match actor.role {
		Role::Admin | Role::Owner => true,
		Role::Technician => {
			actor.technician_id.is_some() && order.technician_id == actor.technician_id
		},
		Role::Tenant => order.tenant_id == actor.user_id,
	}
}

/// Repository for service orders.
pub struct OrderRepository {
	storage: Arc<StorageService>,
}

impl OrderRepository {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	pub async fn insert(&self, order: &ServiceOrder) -> Result<(), StorageError> {
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id.to_string(), order)
			.await
	}

	pub async fn get(&self, id: &Uuid) -> Result<ServiceOrder, StorageError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), &id.to_string())
			.await
	}

	/// Finds an order by its public tracking code.
	///
	/// Codes are generated uppercase; lookups are case-insensitive so
	/// hand-typed codes still resolve.
	pub async fn get_by_tracking(&self, code: &str) -> Result<Option<ServiceOrder>, StorageError> {
		let orders: Vec<ServiceOrder> = self.storage.list(StorageKey::Orders.as_str()).await?;
		Ok(orders
			.into_iter()
			.find(|order| order.tracking_code.eq_ignore_ascii_case(code)))
	}

	/// Persists `updated` only if the stored order still matches `prior`.
	pub async fn update_guarded(
		&self,
		prior: &ServiceOrder,
		updated: &ServiceOrder,
	) -> Result<(), StorageError> {
		self.storage
			.update_guarded(
				StorageKey::Orders.as_str(),
				&prior.id.to_string(),
				prior,
				updated,
			)
			.await
	}

	/// Lists the orders visible to an actor, newest first.
	pub async fn list_scoped(&self, actor: &Actor) -> Result<Vec<ServiceOrder>, StorageError> {
		let mut orders: Vec<ServiceOrder> = self.storage.list(StorageKey::Orders.as_str()).await?;
		orders.retain(|order| visible_to(actor, order));
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Computes aggregate statistics over completed orders.
	///
	/// `revenue_by_month` covers the trailing `lookback_months` calendar
	/// months up to `now`, zero-filled and oldest first. Totals and the
	/// category distribution cover all completed orders regardless of
	/// the window.
	pub async fn stats(
		&self,
		lookback_months: u32,
		now: DateTime<Utc>,
	) -> Result<ReportStats, StorageError> {
		let orders: Vec<ServiceOrder> = self.storage.list(StorageKey::Orders.as_str()).await?;

		let mut window = Vec::with_capacity(lookback_months as usize);
		let mut cursor = month_of(&now);
		for _ in 0..lookback_months {
			window.push(cursor);
			cursor = previous_month(cursor);
		}
		window.reverse();

		let mut by_month: HashMap<(i32, u32), Decimal> =
			window.iter().map(|month| (*month, Decimal::ZERO)).collect();
		let current_month = month_of(&now);

		let mut total_completed = 0u64;
		let mut total_revenue = Decimal::ZERO;
		let mut current_month_revenue = Decimal::ZERO;
		let mut distribution = CategoryDistribution::default();

		for order in orders
			.iter()
			.filter(|order| order.status == OrderStatus::Completed)
		{
			total_completed += 1;
			let price = order.total_price.unwrap_or(Decimal::ZERO);
			total_revenue += price;
			distribution.record(CategoryBucket::from(order.category));

			let month = month_of(&order.created_at);
			if month == current_month {
				current_month_revenue += price;
			}
			if let Some(bucket) = by_month.get_mut(&month) {
				*bucket += price;
			}
		}

		let revenue_by_month = window
			.into_iter()
			.map(|month| MonthlyRevenue {
				month: month_label(month),
				revenue: by_month.get(&month).copied().unwrap_or(Decimal::ZERO),
			})
			.collect();

		Ok(ReportStats {
			total_completed,
			total_revenue,
			current_month_revenue,
			category_distribution: distribution,
			revenue_by_month,
		})
	}
}

fn month_of(timestamp: &DateTime<Utc>) -> (i32, u32) {
	(timestamp.year(), timestamp.month())
}

fn previous_month((year, month): (i32, u32)) -> (i32, u32) {
	if month == 1 {
		(year - 1, 12)
	} else {
		(year, month - 1)
	}
}

fn month_label((year, month): (i32, u32)) -> String {
	format!("{:04}-{:02}", year, month)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use fixline_storage::implementations::memory::MemoryStorage;
	use fixline_types::{NewOrder, ServiceCategory};

	fn repo() -> OrderRepository {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		OrderRepository::new(storage)
	}

	fn order_for(
		tenant_id: i64,
		category: ServiceCategory,
		status: OrderStatus,
		price: Option<Decimal>,
		created_at: DateTime<Utc>,
	) -> ServiceOrder {
		let mut order = ServiceOrder::create(
			tenant_id,
			NewOrder {
				category,
				description: "test order".to_string(),
				owner_id: Some(2),
				equipment_id: None,
				tenant_image: None,
			},
		);
		order.status = status;
		order.total_price = price;
		order.created_at = created_at;
		order
	}

	fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
	}

	#[tokio::test]
	async fn test_insert_get_roundtrip() {
		let repo = repo();
		let order = order_for(
			5,
			ServiceCategory::NotCold,
			OrderStatus::PendingOwner,
			None,
			Utc::now(),
		);
		repo.insert(&order).await.unwrap();

		let loaded = repo.get(&order.id).await.unwrap();
		assert_eq!(loaded, order);
	}

	#[tokio::test]
	async fn test_get_missing_is_not_found() {
		let repo = repo();
		let result = repo.get(&Uuid::new_v4()).await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_tracking_lookup_is_case_insensitive() {
		let repo = repo();
		let order = order_for(
			5,
			ServiceCategory::Other,
			OrderStatus::PendingOwner,
			None,
			Utc::now(),
		);
		repo.insert(&order).await.unwrap();

		let found = repo
			.get_by_tracking(&order.tracking_code.to_lowercase())
			.await
			.unwrap();
		assert_eq!(found.map(|o| o.id), Some(order.id));

		let missing = repo.get_by_tracking("SRV-00000000").await.unwrap();
		assert!(missing.is_none());
	}

	#[tokio::test]
	async fn test_guarded_update_rejects_stale_snapshot() {
		let repo = repo();
		let order = order_for(
			5,
			ServiceCategory::Leaking,
			OrderStatus::PendingOwner,
			None,
			Utc::now(),
		);
		repo.insert(&order).await.unwrap();

		let snapshot = repo.get(&order.id).await.unwrap();

		// First writer wins.
		let mut approved = snapshot.clone();
		approved.status = OrderStatus::Approved;
		approved.technician_id = Some(9);
		repo.update_guarded(&snapshot, &approved).await.unwrap();

		// Second writer raced from the same snapshot and must lose.
		let mut cancelled = snapshot.clone();
		cancelled.status = OrderStatus::Cancelled;
		let result = repo.update_guarded(&snapshot, &cancelled).await;
		assert!(matches!(result, Err(StorageError::Conflict)));

		let stored = repo.get(&order.id).await.unwrap();
		assert_eq!(stored.status, OrderStatus::Approved);
	}

	#[tokio::test]
	async fn test_scoped_lists_per_role() {
		let repo = repo();

		let mut mine = order_for(
			5,
			ServiceCategory::NotCold,
			OrderStatus::Approved,
			None,
			at(2025, 5, 1),
		);
		mine.technician_id = Some(9);
		let theirs = order_for(
			6,
			ServiceCategory::Cleaning,
			OrderStatus::PendingOwner,
			None,
			at(2025, 5, 2),
		);
		repo.insert(&mine).await.unwrap();
		repo.insert(&theirs).await.unwrap();

		let admin = repo.list_scoped(&Actor::new(1, Role::Admin)).await.unwrap();
		assert_eq!(admin.len(), 2);
		// Newest first.
		assert_eq!(admin[0].id, theirs.id);

		let owner = repo.list_scoped(&Actor::new(2, Role::Owner)).await.unwrap();
		assert_eq!(owner.len(), 2);

		let tech = repo
			.list_scoped(&Actor::technician(40, 9))
			.await
			.unwrap();
		assert_eq!(tech.len(), 1);
		assert_eq!(tech[0].id, mine.id);

		let other_tech = repo
			.list_scoped(&Actor::technician(41, 7))
			.await
			.unwrap();
		assert!(other_tech.is_empty());

		let tenant = repo.list_scoped(&Actor::new(5, Role::Tenant)).await.unwrap();
		assert_eq!(tenant.len(), 1);
		assert_eq!(tenant[0].id, mine.id);
	}

	#[tokio::test]
	async fn test_stats_on_empty_storage_are_zero_filled() {
		let repo = repo();
		let stats = repo.stats(3, at(2025, 5, 20)).await.unwrap();

		assert_eq!(stats.total_completed, 0);
		assert_eq!(stats.total_revenue, Decimal::ZERO);
		assert_eq!(stats.current_month_revenue, Decimal::ZERO);
		assert_eq!(stats.category_distribution, CategoryDistribution::default());

		let months: Vec<&str> = stats
			.revenue_by_month
			.iter()
			.map(|m| m.month.as_str())
			.collect();
		assert_eq!(months, vec!["2025-03", "2025-04", "2025-05"]);
		assert!(stats
			.revenue_by_month
			.iter()
			.all(|m| m.revenue == Decimal::ZERO));
	}

	#[tokio::test]
	async fn test_stats_aggregate_completed_orders() {
		let repo = repo();

		let completed_now = order_for(
			5,
			ServiceCategory::NotCold,
			OrderStatus::Completed,
			Some(Decimal::from(450)),
			at(2025, 5, 10),
		);
		let completed_last_month = order_for(
			5,
			ServiceCategory::Cleaning,
			OrderStatus::Completed,
			Some(Decimal::from(150)),
			at(2025, 4, 3),
		);
		let completed_outside_window = order_for(
			6,
			ServiceCategory::Other,
			OrderStatus::Completed,
			Some(Decimal::from(100)),
			at(2024, 12, 24),
		);
		let cancelled = order_for(
			6,
			ServiceCategory::Noise,
			OrderStatus::Cancelled,
			None,
			at(2025, 5, 11),
		);
		for order in [
			&completed_now,
			&completed_last_month,
			&completed_outside_window,
			&cancelled,
		] {
			repo.insert(order).await.unwrap();
		}

		let stats = repo.stats(3, at(2025, 5, 20)).await.unwrap();
		assert_eq!(stats.total_completed, 3);
		assert_eq!(stats.total_revenue, Decimal::from(700));
		assert_eq!(stats.current_month_revenue, Decimal::from(450));
		assert_eq!(stats.category_distribution.repair, 1);
		assert_eq!(stats.category_distribution.cleaning, 1);
		assert_eq!(stats.category_distribution.other, 1);

		let window: Vec<(&str, Decimal)> = stats
			.revenue_by_month
			.iter()
			.map(|m| (m.month.as_str(), m.revenue))
			.collect();
		assert_eq!(
			window,
			vec![
				("2025-03", Decimal::ZERO),
				("2025-04", Decimal::from(150)),
				("2025-05", Decimal::from(450)),
			]
		);
	}

	#[tokio::test]
	async fn test_stats_window_crosses_year_boundary() {
		let repo = repo();
		let stats = repo.stats(3, at(2025, 1, 15)).await.unwrap();
		let months: Vec<&str> = stats
			.revenue_by_month
			.iter()
			.map(|m| m.month.as_str())
			.collect();
		assert_eq!(months, vec!["2024-11", "2024-12", "2025-01"]);
	}
}
