#![forbid(unsafe_code)]

pub mod delivery;
pub mod dialect;
pub mod error;
pub mod info;
pub mod notification;
pub mod payload;

pub use delivery::{deliver, DeliverySink, GotifySink, LogSink, SinkError, SinkSetupError};
pub use dialect::{classify, normalize, normalize_as, Dialect};
pub use error::{DeliveryError, ValidationError};
pub use info::{ForwarderInfo, FORWARDER_INFO};
pub use notification::{Notification, Priority, DEFAULT_TITLE};
pub use payload::{decode_payload, RawPayload};
