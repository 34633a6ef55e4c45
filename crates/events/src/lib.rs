//! Console notifications (toasts).
//!
//! Form submissions and row actions publish [`Notification`]s on the
//! [`NotificationBus`]; whatever renders the console subscribes and shows
//! them.

pub mod bus;

pub use bus::{drain, Notification, NotificationBus, NotificationLevel};
