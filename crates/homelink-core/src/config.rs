//! Bridge configuration.
//!
//! Everything is environment-driven with sane defaults, so the binary runs
//! with no config file. Unparseable numeric values fall back to the default
//! with a warning rather than aborting startup.

use std::time::Duration;

use tracing::warn;

/// Environment variable names.
pub mod env_vars {
    pub const MQTT_BROKER: &str = "MQTT_BROKER";
    pub const MQTT_PORT: &str = "MQTT_PORT";
    pub const MQTT_TOPIC_SENSOR: &str = "MQTT_TOPIC_SENSOR";
    pub const MQTT_TOPIC_STATUS: &str = "MQTT_TOPIC_STATUS";
    pub const MQTT_TOPIC_HEARTBEAT: &str = "MQTT_TOPIC_HEARTBEAT";
    pub const MQTT_TOPIC_COMMAND: &str = "MQTT_TOPIC_COMMAND";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_ENDPOINT: &str = "OPENAI_ENDPOINT";
    pub const LLM_MODEL: &str = "LLM_MODEL";
    pub const LLM_TIMEOUT_SECS: &str = "LLM_TIMEOUT_SECS";
    pub const LIVENESS_WINDOW_SECS: &str = "LIVENESS_WINDOW_SECS";
    pub const LIVENESS_POLL_SECS: &str = "LIVENESS_POLL_SECS";
    pub const WEB_ORIGINS: &str = "WEB_ORIGINS";
    pub const CORS_ORIGINS: &str = "CORS_ORIGINS";
    pub const PORT: &str = "PORT";
}

/// Default values.
pub mod defaults {
    pub const MQTT_BROKER: &str = "localhost";
    pub const MQTT_PORT: u16 = 1883;
    pub const TOPIC_SENSOR: &str = "home/sensor";
    pub const TOPIC_STATUS: &str = "home/status";
    pub const TOPIC_HEARTBEAT: &str = "home/heartbeat";
    pub const TOPIC_COMMAND: &str = "home/command";
    pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
    pub const LLM_MODEL: &str = "gpt-4o-mini";
    pub const LLM_TIMEOUT_SECS: u64 = 30;
    pub const LIVENESS_WINDOW_SECS: u64 = 120;
    pub const LIVENESS_POLL_SECS: u64 = 30;
    pub const HTTP_PORT: u16 = 8080;
}

/// The four MQTT topics the bridge speaks on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet {
    pub sensor: String,
    pub status: String,
    pub heartbeat: String,
    pub command: String,
}

impl Default for TopicSet {
    fn default() -> Self {
        Self {
            sensor: defaults::TOPIC_SENSOR.to_string(),
            status: defaults::TOPIC_STATUS.to_string(),
            heartbeat: defaults::TOPIC_HEARTBEAT.to_string(),
            command: defaults::TOPIC_COMMAND.to_string(),
        }
    }
}

/// MQTT broker settings.
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub broker: String,
    pub port: u16,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            broker: defaults::MQTT_BROKER.to_string(),
            port: defaults::MQTT_PORT,
        }
    }
}

/// Classifier settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: defaults::OPENAI_ENDPOINT.to_string(),
            model: defaults::LLM_MODEL.to_string(),
            timeout: Duration::from_secs(defaults::LLM_TIMEOUT_SECS),
        }
    }
}

/// Liveness monitor settings.
#[derive(Debug, Clone)]
pub struct LivenessSettings {
    /// Maximum silence before the device is presumed offline.
    pub window: Duration,
    /// How often the monitor checks.
    pub poll_interval: Duration,
}

impl Default for LivenessSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(defaults::LIVENESS_WINDOW_SECS),
            poll_interval: Duration::from_secs(defaults::LIVENESS_POLL_SECS),
        }
    }
}

/// Full bridge configuration.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    pub mqtt: MqttSettings,
    pub topics: TopicSet,
    pub llm: LlmSettings,
    pub liveness: LivenessSettings,
    pub http_port: u16,
    /// Allowed CORS origins; empty means allow any, matching the reference
    /// deployment's behavior when no origin list is configured.
    pub web_origins: Vec<String>,
}

impl BridgeConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        let topics = TopicSet {
            sensor: env_or(env_vars::MQTT_TOPIC_SENSOR, defaults::TOPIC_SENSOR),
            status: env_or(env_vars::MQTT_TOPIC_STATUS, defaults::TOPIC_STATUS),
            heartbeat: env_or(env_vars::MQTT_TOPIC_HEARTBEAT, defaults::TOPIC_HEARTBEAT),
            command: env_or(env_vars::MQTT_TOPIC_COMMAND, defaults::TOPIC_COMMAND),
        };

        let mqtt = MqttSettings {
            broker: env_or(env_vars::MQTT_BROKER, defaults::MQTT_BROKER),
            port: env_parsed(env_vars::MQTT_PORT, defaults::MQTT_PORT),
        };

        let llm = LlmSettings {
            api_key: std::env::var(env_vars::OPENAI_API_KEY).unwrap_or_default(),
            endpoint: env_or(env_vars::OPENAI_ENDPOINT, defaults::OPENAI_ENDPOINT),
            model: env_or(env_vars::LLM_MODEL, defaults::LLM_MODEL),
            timeout: Duration::from_secs(env_parsed(
                env_vars::LLM_TIMEOUT_SECS,
                defaults::LLM_TIMEOUT_SECS,
            )),
        };

        let liveness = LivenessSettings {
            window: Duration::from_secs(env_parsed(
                env_vars::LIVENESS_WINDOW_SECS,
                defaults::LIVENESS_WINDOW_SECS,
            )),
            poll_interval: Duration::from_secs(env_parsed(
                env_vars::LIVENESS_POLL_SECS,
                defaults::LIVENESS_POLL_SECS,
            )),
        };

        Self {
            mqtt,
            topics,
            llm,
            liveness,
            http_port: env_parsed(env_vars::PORT, defaults::HTTP_PORT),
            web_origins: web_origins_from_env(),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("invalid value for {name}: {raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}

fn web_origins_from_env() -> Vec<String> {
    let raw = std::env::var(env_vars::WEB_ORIGINS)
        .or_else(|_| std::env::var(env_vars::CORS_ORIGINS))
        .unwrap_or_default();
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
