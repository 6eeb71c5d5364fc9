pub mod bot_profile;

pub use bot_profile::BotProfile;
