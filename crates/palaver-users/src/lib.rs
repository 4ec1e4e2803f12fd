pub mod error;
pub mod profiles;
pub mod types;

pub use error::ProfileError;
pub use profiles::UserProfiles;
pub use types::{ProfileRecord, SettingsDocument};
