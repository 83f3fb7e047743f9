pub mod dispatcher;
pub mod registry;
pub mod stream;

pub use dispatcher::{DeliveryReport, Dispatcher};
pub use registry::{ChannelHandle, NotificationRegistry, Subscription};
