use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Mail server root; the root hints file lives directly under it.
    #[serde(default = "default_root_path")]
    pub root_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
        }
    }
}

fn default_root_path() -> String {
    "/var/MailRoot/".to_string()
}
