pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fixtures;
pub mod notifications;
pub mod source;
pub mod store;

pub use catalog::filter::{categories, filter, sort_products, FilterCriteria, SortOrder};
pub use catalog::inventory::{apply, InventoryOp};
pub use catalog::Catalog;
pub use domain::product::{Product, ProductDraft, ProductId, ProductPatch};
pub use errors::{InterfaceError, InventoryError, SourceError, StoreError};
pub use notifications::{
    InMemoryNotificationSink, Notification, NotificationLevel, NotificationSink,
};
pub use source::{FixtureProductSource, JsonFileProductSource, ProductSource};
pub use store::{CatalogStore, Latency, StoreSettings};
