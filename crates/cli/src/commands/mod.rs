pub mod browse;
pub mod config;
pub mod mutate;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use sweetshop_core::config::{AppConfig, LoadOptions};
use sweetshop_core::source;
use sweetshop_core::{CatalogStore, InMemoryNotificationSink, Product};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(flatten)]
    payload: Payload,
}

impl CommandResult {
    pub(crate) fn success_with(command: &str, message: impl Into<String>, payload: Payload) -> Self {
        let outcome = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            payload,
        };
        Self { exit_code: 0, output: serialize_payload(outcome) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::failure_with(command, error_class, message, exit_code, Payload::default())
    }

    pub(crate) fn failure_with(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        payload: Payload,
    ) -> Self {
        let outcome = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            payload,
        };
        Self { exit_code, output: serialize_payload(outcome) }
    }
}

fn serialize_payload(outcome: CommandOutcome) -> String {
    serde_json::to_string(&outcome).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// One browsing session: validated config, a runtime, and a freshly seeded store.
pub(crate) struct Session {
    pub store: CatalogStore,
    pub notifications: InMemoryNotificationSink,
    runtime: Runtime,
}

impl Session {
    pub fn open(command: &str) -> Result<Self, CommandResult> {
        let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
            CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            )
        })?;

        let runtime =
            tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
                CommandResult::failure(
                    command,
                    "runtime_init",
                    format!("failed to initialize async runtime: {error}"),
                    3,
                )
            })?;

        let notifications = InMemoryNotificationSink::default();
        let source = source::from_seed_path(config.catalog.seed_path.clone());
        let cancel = CancellationToken::new();
        let loading = CatalogStore::load(
            source.as_ref(),
            config.catalog.store_settings(),
            Arc::new(notifications.clone()),
            &cancel,
        );
        let store = runtime
            .block_on(interruptible(command, &cancel, loading))
            .map_err(|error| {
                CommandResult::failure(command, error.class(), error.to_string(), 4)
            })?;

        Ok(Self { store, notifications, runtime })
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn last_notification(&self) -> Option<String> {
        self.notifications.notifications().pop().map(|notification| notification.message)
    }
}

/// Drives `future` to completion. Ctrl-C cancels `cancel` so the store can
/// stop at its next wait point instead of the process dying mid-operation.
pub(crate) async fn interruptible<F: Future>(
    command: &str,
    cancel: &CancellationToken,
    future: F,
) -> F::Output {
    tokio::pin!(future);
    tokio::select! {
        output = &mut future => output,
        _ = tokio::signal::ctrl_c() => {
            info!(event_name = "system.cli.interrupted", command, "cancelling operation");
            cancel.cancel();
            future.await
        }
    }
}
