use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::filter::{self, FilterCriteria, SortOrder};
use crate::catalog::inventory::InventoryOp;
use crate::catalog::Catalog;
use crate::domain::product::{Product, ProductId};
use crate::errors::{InterfaceError, SourceError, StoreError};
use crate::notifications::{Notification, NotificationSink};
use crate::source::ProductSource;

/// Simulated delay per step. Create and Update share `save`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Latency {
    pub load: Duration,
    pub purchase: Duration,
    pub restock: Duration,
    pub save: Duration,
    pub delete: Duration,
}

impl Latency {
    pub fn uniform(delay: Duration) -> Self {
        Self { load: delay, purchase: delay, restock: delay, save: delay, delete: delay }
    }

    pub fn for_op(&self, op: &InventoryOp) -> Duration {
        match op {
            InventoryOp::Purchase { .. } => self.purchase,
            InventoryOp::Restock { .. } => self.restock,
            InventoryOp::Create { .. } | InventoryOp::Update { .. } => self.save,
            InventoryOp::Delete { .. } => self.delete,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreSettings {
    pub latency: Latency,
    /// ISO code shown next to prices in notifications.
    pub currency: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { latency: Latency::default(), currency: "USD".to_string() }
    }
}

/// Single owner of the live catalog for one browsing session.
///
/// Mutations wait out the simulated latency first, then run to completion
/// under the write lock, so readers never observe a half-applied operation
/// and operations on the same product are serialized.
pub struct CatalogStore {
    catalog: RwLock<Catalog>,
    settings: StoreSettings,
    notifications: Arc<dyn NotificationSink>,
}

impl CatalogStore {
    pub fn new(
        catalog: Catalog,
        settings: StoreSettings,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self { catalog: RwLock::new(catalog), settings, notifications }
    }

    /// Waits the load delay, then seeds the catalog from `source`.
    pub async fn load(
        source: &dyn ProductSource,
        settings: StoreSettings,
        notifications: Arc<dyn NotificationSink>,
        cancel: &CancellationToken,
    ) -> Result<Self, StoreError> {
        if let Err(error) = wait(settings.latency.load, cancel).await {
            warn!(event_name = "catalog.store.load_cancelled", "catalog load cancelled");
            return Err(error);
        }

        let products = source.load().await?;
        let catalog = Catalog::new(products).map_err(SourceError::from)?;
        info!(
            event_name = "catalog.store.seeded",
            product_count = catalog.len(),
            load_ms = settings.latency.load.as_millis() as u64,
            currency = %settings.currency,
            "catalog seeded"
        );
        Ok(Self::new(catalog, settings, notifications))
    }

    pub async fn snapshot(&self) -> Vec<Product> {
        self.catalog.read().await.products().to_vec()
    }

    pub async fn browse(&self, criteria: &FilterCriteria, order: SortOrder) -> Vec<Product> {
        let mut products = self.catalog.read().await.filter(criteria);
        filter::sort_products(&mut products, order);
        debug!(
            event_name = "catalog.store.browsed",
            text = %criteria.text,
            category = criteria.category.as_deref().unwrap_or(""),
            result_count = products.len(),
            "catalog browsed"
        );
        products
    }

    pub async fn categories(&self) -> Vec<String> {
        filter::categories(self.catalog.read().await.products())
    }

    /// Applies one mutation and publishes a notification describing the outcome.
    pub async fn submit(
        &self,
        op: InventoryOp,
        cancel: &CancellationToken,
    ) -> Result<Product, StoreError> {
        let operation = op.name();
        let target = op.target().cloned();

        if let Err(error) = wait(self.settings.latency.for_op(&op), cancel).await {
            warn!(
                event_name = "catalog.mutation.cancelled",
                operation,
                product_id = target.as_ref().map(ProductId::as_str).unwrap_or("new"),
                "mutation cancelled before it was applied"
            );
            self.publish_failure(operation, target, &error);
            return Err(error);
        }

        let restock_amount = match &op {
            InventoryOp::Restock { amount, .. } => Some(*amount),
            _ => None,
        };
        let result = self.catalog.write().await.apply(op);

        match result {
            Ok(product) => {
                info!(
                    event_name = "catalog.mutation.applied",
                    operation,
                    product_id = product.id.as_str(),
                    quantity = product.quantity,
                    "mutation applied"
                );
                self.notifications.publish(Notification::success(
                    operation,
                    success_message(operation, &product, restock_amount, &self.settings.currency),
                    Some(product.id.clone()),
                ));
                Ok(product)
            }
            Err(error) => {
                warn!(
                    event_name = "catalog.mutation.rejected",
                    operation,
                    product_id = target.as_ref().map(ProductId::as_str).unwrap_or("new"),
                    error_class = error.class(),
                    error = %error,
                    "mutation rejected"
                );
                let error = StoreError::from(error);
                self.publish_failure(operation, target, &error);
                Err(error)
            }
        }
    }

    fn publish_failure(&self, operation: &str, target: Option<ProductId>, error: &StoreError) {
        let message = InterfaceError::from(error).user_message();
        self.notifications.publish(Notification::failure(operation, message, target));
    }
}

/// Simulated latency. An already-cancelled token wins even when `delay` is zero.
async fn wait(delay: Duration, cancel: &CancellationToken) -> Result<(), StoreError> {
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    if delay.is_zero() {
        return Ok(());
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

fn success_message(
    operation: &str,
    product: &Product,
    restock_amount: Option<i64>,
    currency: &str,
) -> String {
    match operation {
        "purchase" => format!(
            "Purchased {} for {} {currency}. {} left in stock.",
            product.name, product.price, product.quantity
        ),
        "restock" => format!(
            "Restocked {} with {} units. {} in stock.",
            product.name,
            restock_amount.unwrap_or_default(),
            product.quantity
        ),
        "create" => {
            format!("Added {} to the catalog at {} {currency}.", product.name, product.price)
        }
        "update" => format!("Saved changes to {} ({} {currency}).", product.name, product.price),
        "delete" => format!("Removed {} from the catalog.", product.name),
        _ => format!("{operation} applied to {}.", product.name),
    }
}
