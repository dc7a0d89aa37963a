//! Client side: HTTP access to the API and the confirmation poller.

pub mod api_client;
pub mod poller;
pub mod render;

pub use api_client::{ApiClient, ClientError, StatusApi};
pub use poller::{
    poll_cycle, ConfirmationPoller, LogNotifier, NotificationKind, Notifier, TransactionView,
};
