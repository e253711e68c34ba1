//! Settings for the default HTTP transport.

use std::time::Duration;

/// Deadlines and pool sizing for [`HyperTransport`](crate::HyperTransport).
///
/// | Field | Default | Applied by |
/// |-------|---------|------------|
/// | `timeout` | 30 s | wraps the wait for the response head |
/// | `connect_timeout` | 10 s | the TCP connector |
/// | `pool_idle_per_host` | 32 | the hyper-util connection pool |
/// | `pool_idle_timeout` | 90 s | the hyper-util connection pool |
///
/// The body is read after `timeout` stops counting, so a slow body is not
/// cut off. A [`Client`](crate::Client) adds no deadline of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Wait for the response status and headers.
    pub timeout: Duration,
    /// Wait for the TCP connection to open.
    pub connect_timeout: Duration,
    /// Idle connections kept open for each host.
    pub pool_idle_per_host: usize,
    /// Idle connections older than this are closed.
    pub pool_idle_timeout: Duration,
}

impl TransportConfig {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    const DEFAULT_POOL_IDLE_PER_HOST: usize = 32;
    const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Start from the defaults and override selected fields.
    ///
    /// ```
    /// use std::time::Duration;
    /// use apiclient::TransportConfig;
    ///
    /// let config = TransportConfig::builder()
    ///     .timeout(Duration::from_secs(5))
    ///     .build();
    /// assert_eq!(config.connect_timeout, Duration::from_secs(10));
    /// ```
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            pool_idle_per_host: Self::DEFAULT_POOL_IDLE_PER_HOST,
            pool_idle_timeout: Self::DEFAULT_POOL_IDLE_TIMEOUT,
        }
    }
}

/// Builder for [`TransportConfig`]; unset fields keep their default.
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl TransportConfigBuilder {
    /// Override [`TransportConfig::timeout`].
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override [`TransportConfig::connect_timeout`].
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Override [`TransportConfig::pool_idle_per_host`].
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Override [`TransportConfig::pool_idle_timeout`].
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Resolve the configuration.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout.unwrap_or(TransportConfig::DEFAULT_TIMEOUT),
            connect_timeout: self
                .connect_timeout
                .unwrap_or(TransportConfig::DEFAULT_CONNECT_TIMEOUT),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(TransportConfig::DEFAULT_POOL_IDLE_PER_HOST),
            pool_idle_timeout: self
                .pool_idle_timeout
                .unwrap_or(TransportConfig::DEFAULT_POOL_IDLE_TIMEOUT),
        }
    }
}
