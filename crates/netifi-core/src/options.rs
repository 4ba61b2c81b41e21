//! Connection handshake options.

use std::time::Duration;

/// MIME type used for both data and metadata unless overridden.
pub const DEFAULT_MIME_TYPE: &str = "application/binary";

/// Transport-level options sent with the connection setup.
///
/// The broker routing frame travels separately as the setup metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOptions {
    /// Interval between keep-alive frames
    pub keepalive_interval: Duration,
    /// Time without keep-alive after which the peer is considered gone
    pub keepalive_lifetime: Duration,
    /// MIME type of call data
    pub data_mime_type: String,
    /// MIME type of call metadata
    pub metadata_mime_type: String,
}

impl SetupOptions {
    /// Replace the keep-alive interval and lifetime.
    #[must_use]
    pub fn with_keepalive(mut self, interval: Duration, lifetime: Duration) -> Self {
        self.keepalive_interval = interval;
        self.keepalive_lifetime = lifetime;
        self
    }

    /// Replace both MIME types.
    #[must_use]
    pub fn with_mime_types(mut self, data: impl Into<String>, metadata: impl Into<String>) -> Self {
        self.data_mime_type = data.into();
        self.metadata_mime_type = metadata.into();
        self
    }
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(60),
            keepalive_lifetime: Duration::from_secs(180),
            data_mime_type: DEFAULT_MIME_TYPE.to_string(),
            metadata_mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = SetupOptions::default();
        assert_eq!(options.keepalive_interval, Duration::from_secs(60));
        assert_eq!(options.keepalive_lifetime, Duration::from_secs(180));
        assert_eq!(options.data_mime_type, "application/binary");
        assert_eq!(options.metadata_mime_type, "application/binary");
    }

    #[test]
    fn overrides_keep_other_fields() {
        let options = SetupOptions::default()
            .with_keepalive(Duration::from_secs(5), Duration::from_secs(15))
            .with_mime_types("application/json", "message/x.rsocket.routing.v0");

        assert_eq!(options.keepalive_interval, Duration::from_secs(5));
        assert_eq!(options.keepalive_lifetime, Duration::from_secs(15));
        assert_eq!(options.data_mime_type, "application/json");
        assert_eq!(options.metadata_mime_type, "message/x.rsocket.routing.v0");
    }
}
