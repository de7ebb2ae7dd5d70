use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::ProductId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Failure,
}

/// A toast-style message describing the outcome of one catalog mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub level: NotificationLevel,
    pub operation: String,
    pub message: String,
    pub product_id: Option<ProductId>,
    pub occurred_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        operation: impl Into<String>,
        message: impl Into<String>,
        product_id: Option<ProductId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            level,
            operation: operation.into(),
            message: message.into(),
            product_id,
            occurred_at: Utc::now(),
        }
    }

    pub fn success(
        operation: impl Into<String>,
        message: impl Into<String>,
        product_id: Option<ProductId>,
    ) -> Self {
        Self::new(NotificationLevel::Success, operation, message, product_id)
    }

    pub fn failure(
        operation: impl Into<String>,
        message: impl Into<String>,
        product_id: Option<ProductId>,
    ) -> Self {
        Self::new(NotificationLevel::Failure, operation, message, product_id)
    }
}

pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: Notification);
}

#[derive(Clone, Default)]
pub struct InMemoryNotificationSink {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotificationSink {
    pub fn notifications(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(notifications) => notifications.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationSink for InMemoryNotificationSink {
    fn publish(&self, notification: Notification) {
        match self.notifications.lock() {
            Ok(mut notifications) => notifications.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
