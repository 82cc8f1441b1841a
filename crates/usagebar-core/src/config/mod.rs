mod settings;

pub use settings::{Config, NotificationSettings, Settings};
