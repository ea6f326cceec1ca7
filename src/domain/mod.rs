pub mod channel;
pub mod item;
pub mod record;

pub use channel::ChannelMetadata;
pub use item::CanonicalItem;
pub use record::{HeaderIndex, RawRecord};
