use crate::chain::Channel;
use crate::config::RegistryConfig;

use super::handle::Registry;

/// Builder for constructing a [`Registry`] over an existing or a fresh channel.
pub struct RegistryBuilder<T> {
    cfg: RegistryConfig,
    channel: Option<Channel<T>>,
}

impl<T> RegistryBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: RegistryConfig) -> Self {
        Self { cfg, channel: None }
    }

    /// Binds the registry to a channel owned elsewhere.
    ///
    /// The registry never closes a channel it did not create; other handles keep
    /// emitting and observing after the registry is closed.
    pub fn with_channel(mut self, channel: Channel<T>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Builds the registry and spawns its dispatch loop.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn build(self) -> Registry<T> {
        match self.channel {
            Some(channel) => Registry::start(self.cfg, channel, false),
            None => Registry::start(self.cfg, Channel::new(), true),
        }
    }
}
