//! Notification side-channel: feed, unread count, polling and toasts.

pub mod poller;
pub mod store;
pub mod toast;

pub use poller::NotificationPoller;
pub use store::{NotificationFeed, NotificationStore};
pub use toast::{Toast, ToastLevel};
