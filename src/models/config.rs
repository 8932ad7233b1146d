//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// Identifier of the hosted database; opaque to the service.
    pub database_id: String,
    pub templates_dir: String,
    pub secret: String,
    pub collections: CollectionIds,
}

/// Collection identifiers of each entity, provided by the environment.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CollectionIds {
    pub patients: String,
    pub payments: String,
    pub treatments: String,
    pub appointments: String,
    pub inventory: String,
    pub services: String,
}

impl Default for CollectionIds {
    fn default() -> Self {
        Self {
            patients: "patients".into(),
            payments: "payments".into(),
            treatments: "treatments".into(),
            appointments: "appointments".into(),
            inventory: "inventory".into(),
            services: "services".into(),
        }
    }
}
