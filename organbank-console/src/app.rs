//! Application root shared by every command.

use crate::config::Settings;
use organbank_core::events::EventBus;
use organbank_core::gateway::Gateway;
use organbank_core::registry::OrganRegistry;
use organbank_sdk::client::GatewayClient;
use std::sync::Arc;

/// Owns the gateway, the bus and the registry for one run.
///
/// Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct App {
    /// The typed client, for calls outside the [`Gateway`] seam.
    pub client: GatewayClient,
    pub gateway: Arc<dyn Gateway>,
    pub bus: EventBus,
    pub registry: OrganRegistry,
    pub settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(concat!("organbank-console/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let client = GatewayClient::new(settings.base_url.clone()).with_http_client(http);
        let gateway: Arc<dyn Gateway> = Arc::new(client.clone());
        let registry =
            OrganRegistry::new(Arc::clone(&gateway)).with_highlight_ttl(settings.highlight_ttl);

        Ok(Self {
            client,
            gateway,
            bus: EventBus::new(),
            registry,
            settings,
        })
    }
}
