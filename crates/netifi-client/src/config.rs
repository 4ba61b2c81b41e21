//! Client configuration.

use std::net::IpAddr;

use netifi_core::SetupOptions;
use netifi_proto::Tags;
use uuid::Uuid;

/// Values resolved once per process and shared by every client.
///
/// Create one at startup and pass it to each
/// [`BrokerClient`](crate::BrokerClient). Clients that do not name a
/// destination use [`destination`](Self::destination), so all of them show up
/// as the same destination at the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDefaults {
    destination: String,
}

impl ClientDefaults {
    /// Generate a fresh random destination name.
    #[must_use]
    pub fn generate() -> Self {
        Self { destination: Uuid::new_v4().to_string() }
    }

    /// Use a fixed destination name.
    pub fn new(destination: impl Into<String>) -> Self {
        Self { destination: destination.into() }
    }

    /// Destination used when a client does not name one
    pub fn destination(&self) -> &str {
        &self.destination
    }
}

/// Everything a client needs to identify itself to the broker.
///
/// Build with [`BrokerClientConfig::builder`]; every field but the group has
/// a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerClientConfig {
    /// Group the client joins
    pub group: String,
    /// Access key id
    pub access_key: i64,
    /// Access token as base64 text
    pub access_token: String,
    /// Connection id, generated per client when absent
    pub connection_id: Option<Uuid>,
    /// Address advertised to the broker
    pub ip_address: Option<IpAddr>,
    /// Destination name, taken from [`ClientDefaults`] when absent
    pub destination: Option<String>,
    /// Feature flags sent verbatim
    pub additional_flags: i16,
    /// Client tags
    pub tags: Tags,
    /// Transport handshake options
    pub setup: SetupOptions,
}

impl BrokerClientConfig {
    /// Start a configuration for `group`.
    pub fn builder(group: impl Into<String>) -> BrokerClientConfigBuilder {
        BrokerClientConfigBuilder {
            config: Self {
                group: group.into(),
                access_key: 0,
                access_token: String::new(),
                connection_id: None,
                ip_address: None,
                destination: None,
                additional_flags: 0,
                tags: Tags::new(),
                setup: SetupOptions::default(),
            },
        }
    }
}

/// Builder for [`BrokerClientConfig`].
#[derive(Debug, Clone)]
pub struct BrokerClientConfigBuilder {
    config: BrokerClientConfig,
}

impl BrokerClientConfigBuilder {
    /// Set the access key id.
    #[must_use]
    pub const fn access_key(mut self, access_key: i64) -> Self {
        self.config.access_key = access_key;
        self
    }

    /// Set the base64 access token.
    #[must_use]
    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.config.access_token = access_token.into();
        self
    }

    /// Use a fixed connection id.
    #[must_use]
    pub const fn connection_id(mut self, connection_id: Uuid) -> Self {
        self.config.connection_id = Some(connection_id);
        self
    }

    /// Advertise an address.
    #[must_use]
    pub const fn ip_address(mut self, ip_address: IpAddr) -> Self {
        self.config.ip_address = Some(ip_address);
        self
    }

    /// Name this destination.
    #[must_use]
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.config.destination = Some(destination.into());
        self
    }

    /// Set the additional flags.
    #[must_use]
    pub const fn additional_flags(mut self, additional_flags: i16) -> Self {
        self.config.additional_flags = additional_flags;
        self
    }

    /// Add one tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.tags.insert(key, value);
        self
    }

    /// Replace all tags.
    #[must_use]
    pub fn tags(mut self, tags: Tags) -> Self {
        self.config.tags = tags;
        self
    }

    /// Set the transport handshake options.
    #[must_use]
    pub fn setup_options(mut self, setup: SetupOptions) -> Self {
        self.config.setup = setup;
        self
    }

    /// Finish the configuration.
    #[must_use]
    pub fn build(self) -> BrokerClientConfig {
        self.config
    }
}
