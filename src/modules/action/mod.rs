pub mod message;
pub mod poster;
pub mod publisher;

pub use message::AnnouncementTemplate;
pub use poster::{ConfiguredPoster, DryRunPoster, StatusPoster, TwitterPoster};
pub use publisher::{PublishReport, Publisher};
