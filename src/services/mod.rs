pub mod conversation;
pub mod data_stores;
pub mod leave_lifecycle;
pub mod line_messaging_client;
pub mod notification_fanout;
pub mod opportunities;

pub use line_messaging_client::LineMessagingClient;
pub use notification_fanout::NotificationFanout;
