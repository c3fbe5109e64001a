// Database Connection Settings

use serde::{Deserialize, Serialize};

/// Connection settings for the probed database.
///
/// Opaque to the engine: the bundle is forwarded to the probe driver as-is.
/// Serialized field names match the on-disk `settings.json` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: String::new(),
            user: String::new(),
            password: String::new(),
        }
    }
}
