use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// When true, status updates are validated against the lifecycle
    /// transition table. When false, any status may replace any other
    /// (legacy behavior).
    pub strict_transitions: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr = env::var("API_BIND_ADDR").unwrap_or_else(|_| {
            warn!("API_BIND_ADDR not set, using default 0.0.0.0:3000");
            "0.0.0.0:3000".to_string()
        });

        let strict_transitions = match env::var("STRICT_TRANSITIONS") {
            Ok(value) => match value.parse::<bool>() {
                Ok(flag) => flag,
                Err(_) => {
                    warn!("STRICT_TRANSITIONS has invalid value {:?}, using true", value);
                    true
                }
            },
            Err(_) => true,
        };

        Self {
            bind_addr,
            strict_transitions,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            strict_transitions: true,
        }
    }
}
