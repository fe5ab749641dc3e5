//! Singleton records of the `about` collection.

use serde::{Deserialize, Serialize};

use crate::db::{Collection, Record};

pub const PROFILE_ID: &str = "profile";
pub const CONNECT_CONFIG_ID: &str = "connect_config";
pub const SENSOR_METRICS_ID: &str = "sensor_metrics";

fn profile_id() -> String {
    PROFILE_ID.to_string()
}

fn connect_config_id() -> String {
    CONNECT_CONFIG_ID.to_string()
}

fn sensor_metrics_id() -> String {
    SENSOR_METRICS_ID.to_string()
}

/// Artist biography shown on the about page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AboutData {
    #[serde(default = "profile_id")]
    pub id: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image_url: String,
}

impl AboutData {
    pub fn new(bio: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: profile_id(),
            bio: bio.into(),
            image_url: image_url.into(),
        }
    }
}

impl Record for AboutData {
    const COLLECTION: Collection = Collection::About;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A labelled outbound link on the contact terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectLink {
    pub label: String,
    pub url: String,
}

/// Contact email and links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectConfig {
    #[serde(default = "connect_config_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub links: Vec<ConnectLink>,
}

impl ConnectConfig {
    pub fn new(email: impl Into<String>, links: Vec<ConnectLink>) -> Self {
        Self {
            id: connect_config_id(),
            email: email.into(),
            links,
        }
    }
}

impl Record for ConnectConfig {
    const COLLECTION: Collection = Collection::About;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Visit and click counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SensorData {
    #[serde(default = "sensor_metrics_id")]
    pub id: String,
    #[serde(default)]
    pub visits: u64,
    #[serde(default)]
    pub clicks: u64,
}

impl Default for SensorData {
    fn default() -> Self {
        Self {
            id: sensor_metrics_id(),
            visits: 0,
            clicks: 0,
        }
    }
}

impl Record for SensorData {
    const COLLECTION: Collection = Collection::About;

    fn id(&self) -> &str {
        &self.id
    }
}
