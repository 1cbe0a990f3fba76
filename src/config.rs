use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Result, TelemetryError};

// ============================================================================
// MAIN CONFIGURATION
// ============================================================================

/// Top-level configuration. Every section has complete defaults so the
/// binary runs without a configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Broker connection settings
    #[serde(default)]
    pub mqtt: MqttConfig,

    /// Moving-entity fleet settings
    #[serde(default)]
    pub fleet: FleetConfig,

    /// Scalar readings settings
    #[serde(default)]
    pub readings: ReadingsConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Build the effective configuration: defaults or the given file, with
    /// the broker host resolved from the environment where the file left it
    /// unset, then validated.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let config = Self::from_file(p)?;
                info!(path = p, "Loaded configuration");
                config
            }
            None => Self::default(),
        };
        config.mqtt.resolve_broker();
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the publishers cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.mqtt.broker_port == 0 {
            return Err(TelemetryError::Config("broker_port must be non-zero".into()));
        }
        if self.fleet.rounds == 0 {
            return Err(TelemetryError::Config("fleet rounds must be non-zero".into()));
        }
        if self.readings.limit == 0 {
            return Err(TelemetryError::Config("readings limit must be non-zero".into()));
        }
        for entity in &self.fleet.entities {
            if entity.name.is_empty() {
                return Err(TelemetryError::Config("entity name must not be empty".into()));
            }
            if !entity.initial_lat.is_finite()
                || !entity.initial_lon.is_finite()
                || !entity.speed_north.is_finite()
                || !entity.speed_east.is_finite()
            {
                return Err(TelemetryError::Config(format!(
                    "entity '{}' has non-finite coordinates or velocity",
                    entity.name
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// MQTT CONFIGURATION
// ============================================================================

/// Broker connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker hostname or IP. When left empty, resolved from the
    /// `MQTT_BROKER` environment variable, falling back to `localhost`.
    #[serde(default)]
    pub broker_host: String,

    /// Broker TCP port
    #[serde(default = "default_mqtt_port")]
    pub broker_port: u16,

    /// Keep-alive interval in seconds
    #[serde(default = "default_mqtt_keepalive")]
    pub keepalive_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: String::new(),
            broker_port: default_mqtt_port(),
            keepalive_secs: default_mqtt_keepalive(),
        }
    }
}

impl MqttConfig {
    /// Fill in the broker host from `MQTT_BROKER` when the configuration
    /// left it empty. A missing variable is not an error: the fallback to
    /// localhost is logged and used.
    pub fn resolve_broker(&mut self) {
        if !self.broker_host.is_empty() {
            return;
        }
        self.broker_host = match std::env::var("MQTT_BROKER") {
            Ok(host) if !host.is_empty() => host,
            _ => {
                info!("Broker hostname not defined, using localhost");
                "localhost".to_string()
            }
        };
    }
}

// ============================================================================
// FLEET CONFIGURATION
// ============================================================================

/// Settings for the moving-entity publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Base topic; each entity publishes to `{base_topic}/{slug}`
    #[serde(default = "default_base_topic")]
    pub base_topic: String,

    /// Number of publish rounds over the whole fleet
    #[serde(default = "default_fleet_rounds")]
    pub rounds: u32,

    /// Delay after every single publish, so one round over the fleet takes
    /// `entities * delay`
    #[serde(default = "default_fleet_delay_ms")]
    pub publish_delay_ms: u64,

    /// The sensor roster
    #[serde(default = "default_entities")]
    pub entities: Vec<EntityConfig>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            base_topic: default_base_topic(),
            rounds: default_fleet_rounds(),
            publish_delay_ms: default_fleet_delay_ms(),
            entities: default_entities(),
        }
    }
}

/// One moving sensor: display name, starting coordinates, constant velocity
/// and a display icon with no behavioral effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Display name; spaces become underscores in the sub-topic
    pub name: String,
    /// Starting latitude in decimal degrees
    pub initial_lat: f64,
    /// Starting longitude in decimal degrees
    pub initial_lon: f64,
    /// Meters per second, negative moves south
    #[serde(default = "default_speed")]
    pub speed_north: f64,
    /// Meters per second, negative moves west
    #[serde(default = "default_speed")]
    pub speed_east: f64,
    /// Display icon, no behavioral effect
    #[serde(default = "default_icon")]
    pub icon: String,
}

/// The stock demo roster around the Arctic Circle.
fn default_entities() -> Vec<EntityConfig> {
    vec![
        EntityConfig {
            name: "Santa Claus".to_string(),
            initial_lat: 66.54328556230257,
            initial_lon: 25.845727069829188,
            speed_north: 1.2,
            speed_east: 1.5,
            icon: ":santa:".to_string(),
        },
        EntityConfig {
            name: "Aeroplane 774".to_string(),
            initial_lat: 66.5547424073456,
            initial_lon: 25.81127964455749,
            speed_north: 75.0,
            speed_east: 57.0,
            icon: ":airplane:".to_string(),
        },
        EntityConfig {
            name: "Heli Aslak".to_string(),
            initial_lat: 66.54085588672697,
            initial_lon: 25.866901092402323,
            speed_north: 55.0,
            speed_east: -57.0,
            icon: "helicopter".to_string(),
        },
        EntityConfig {
            name: "Reindeer 1.".to_string(),
            initial_lat: 66.54655132697363,
            initial_lon: 25.84243694805249,
            speed_north: 2.0,
            speed_east: 4.0,
            icon: ":deer:".to_string(),
        },
        EntityConfig {
            name: "Reindeer 2.".to_string(),
            initial_lat: 66.54749582714075,
            initial_lon: 25.843993522504604,
            speed_north: 2.0,
            speed_east: -4.0,
            icon: ":deer:".to_string(),
        },
    ]
}

// ============================================================================
// READINGS CONFIGURATION
// ============================================================================

/// Settings for the scalar readings publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingsConfig {
    /// Shared topic for all readings
    #[serde(default = "default_base_topic")]
    pub topic: String,

    /// Number of generated samples
    #[serde(default = "default_readings_limit")]
    pub limit: u64,

    /// Delay after every publish
    #[serde(default = "default_readings_delay_ms")]
    pub publish_delay_ms: u64,

    /// Assignment marker carried in the envelope
    #[serde(default = "default_assignment_num")]
    pub assignment_num: u32,
}

impl Default for ReadingsConfig {
    fn default() -> Self {
        Self {
            topic: default_base_topic(),
            limit: default_readings_limit(),
            publish_delay_ms: default_readings_delay_ms(),
            assignment_num: default_assignment_num(),
        }
    }
}

// ============================================================================
// DEFAULT VALUE FUNCTIONS
// ============================================================================

fn default_mqtt_port() -> u16 { 1883 }
fn default_mqtt_keepalive() -> u64 { 60 }
fn default_base_topic() -> String { "hamk/iot-python-client".to_string() }
fn default_fleet_rounds() -> u32 { 35 }
fn default_fleet_delay_ms() -> u64 { 500 }
fn default_readings_limit() -> u64 { 10 }
fn default_readings_delay_ms() -> u64 { 2000 }
fn default_assignment_num() -> u32 { 3 }
fn default_speed() -> f64 { 1.0 }
fn default_icon() -> String { ":star:".to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fleet.entities.len(), 5);
        assert_eq!(config.fleet.rounds, 35);
        assert_eq!(config.fleet.publish_delay_ms, 500);
        assert_eq!(config.readings.limit, 10);
        assert_eq!(config.readings.publish_delay_ms, 2000);
        assert_eq!(config.fleet.base_topic, "hamk/iot-python-client");
    }

    #[test]
    fn default_roster_matches_demo_fleet() {
        let entities = default_entities();
        assert_eq!(entities[0].name, "Santa Claus");
        assert_eq!(entities[0].initial_lat, 66.54328556230257);
        assert_eq!(entities[0].speed_north, 1.2);
        assert_eq!(entities[0].speed_east, 1.5);
        assert_eq!(entities[3].name, "Reindeer 1.");
        assert_eq!(entities[4].speed_east, -4.0);
    }

    #[test]
    fn yaml_overrides_defaults() {
        let yaml = r#"
mqtt:
  broker_host: "broker.example.net"
fleet:
  rounds: 3
  publish_delay_ms: 100
  entities:
    - name: "Sled"
      initial_lat: 60.0
      initial_lon: 25.0
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.mqtt.broker_host, "broker.example.net");
        assert_eq!(config.fleet.rounds, 3);
        assert_eq!(config.fleet.entities.len(), 1);
        assert_eq!(config.fleet.entities[0].speed_north, 1.0);
        assert_eq!(config.fleet.entities[0].icon, ":star:");
        // untouched sections keep their defaults
        assert_eq!(config.readings.limit, 10);
    }

    #[test]
    fn from_file_round_trip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mqtt:\n  broker_port: 1884").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.mqtt.broker_port, 1884);
    }

    #[test]
    fn resolve_broker_prefers_configured_host() {
        let mut mqtt = MqttConfig {
            broker_host: "explicit.example.net".to_string(),
            ..MqttConfig::default()
        };
        mqtt.resolve_broker();
        assert_eq!(mqtt.broker_host, "explicit.example.net");
    }

    #[test]
    fn resolve_broker_falls_back_to_localhost() {
        std::env::remove_var("MQTT_BROKER");
        let mut mqtt = MqttConfig::default();
        mqtt.resolve_broker();
        assert_eq!(mqtt.broker_host, "localhost");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.fleet.rounds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fleet.entities[0].initial_lat = f64::NAN;
        assert!(config.validate().is_err());
    }
}
