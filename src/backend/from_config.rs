//! Wires a registry from a loaded [`Config`]: the config itself resolves
//! policies, and `[transport]` picks the factory.

use super::BackendRegistry;
use crate::config::Config;
use crate::internal;
use crate::transport::{ForwardTransportFactory, JsonlTransportFactory, TransportFactory};
use std::sync::Arc;

impl BackendRegistry {
    /// Registry whose policies and transports follow `config`.
    ///
    /// Unknown transport kinds fall back to the forward transport with a warning.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let factory: Arc<dyn TransportFactory> = match config.transport.kind().to_lowercase().as_str()
        {
            "jsonl" | "file" => {
                let mut factory = config
                    .transport
                    .path
                    .as_ref()
                    .map_or_else(JsonlTransportFactory::default, JsonlTransportFactory::new);
                if let Some(prefix) = &config.general.tag_prefix {
                    factory = factory.tag_prefix(prefix);
                }
                Arc::new(factory)
            }
            kind => {
                if kind != "forward" {
                    internal::warn(
                        "CONFIG",
                        &format!("Unknown transport kind '{kind}', using forward"),
                    );
                }
                let mut factory = ForwardTransportFactory::new(config.remote_settings());
                if let Some(prefix) = &config.general.tag_prefix {
                    factory = factory.tag_prefix(prefix);
                }
                Arc::new(factory)
            }
        };

        Self::builder()
            .policy_resolver(config.clone())
            .shared_transport_factory(factory)
            .build()
    }
}
