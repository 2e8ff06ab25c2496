//! Per-request transport options.
//!
//! Every option is independently optional, and an absent option means
//! "use whatever the transport would do by default". The dispatch layer never
//! interprets these values; it hands them to the transport exactly as given.

use std::fmt;
use std::time::Duration;

use camino::Utf8PathBuf;

/// How the transport should verify the server's TLS certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Verify {
    /// Verify against the transport's default trust roots.
    #[default]
    Enabled,

    /// Skip certificate verification.
    Disabled,

    /// Verify against the certificate authorities in this bundle.
    CaBundle(Utf8PathBuf),
}

impl From<bool> for Verify {
    fn from(verify: bool) -> Self {
        if verify {
            Verify::Enabled
        } else {
            Verify::Disabled
        }
    }
}

impl From<Utf8PathBuf> for Verify {
    fn from(bundle: Utf8PathBuf) -> Self {
        Verify::CaBundle(bundle)
    }
}

/// Client certificate material presented during the TLS handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCert {
    /// Path to the certificate, which may also contain the private key.
    pub cert: Utf8PathBuf,

    /// Path to the private key, when it is stored separately.
    pub key: Option<Utf8PathBuf>,

    /// Password protecting the private key.
    pub password: Option<String>,
}

impl ClientCert {
    /// A certificate file which also holds its private key.
    pub fn new(cert: impl Into<Utf8PathBuf>) -> Self {
        Self {
            cert: cert.into(),
            key: None,
            password: None,
        }
    }

    /// Set the path to a separate private key.
    pub fn with_key(mut self, key: impl Into<Utf8PathBuf>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the password for the private key.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl fmt::Debug for ClientCert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCert")
            .field("cert", &self.cert)
            .field("key", &self.key)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Time budgets for the phases of a request.
///
/// A phase left as `None` has no budget imposed by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Time allowed to establish a connection.
    pub connect: Option<Duration>,

    /// Time allowed between chunks read from the server.
    pub read: Option<Duration>,

    /// Time allowed between chunks written to the server.
    pub write: Option<Duration>,

    /// Time allowed to wait for a connection from a pool.
    pub pool: Option<Duration>,
}

impl TimeoutConfig {
    /// A configuration with no timeouts at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Apply the same timeout to every phase.
    pub fn all(timeout: Duration) -> Self {
        Self {
            connect: Some(timeout),
            read: Some(timeout),
            write: Some(timeout),
            pool: Some(timeout),
        }
    }

    /// Set the connect timeout.
    pub fn connect(mut self, timeout: Duration) -> Self {
        self.connect = Some(timeout);
        self
    }

    /// Set the read timeout.
    pub fn read(mut self, timeout: Duration) -> Self {
        self.read = Some(timeout);
        self
    }

    /// Set the write timeout.
    pub fn write(mut self, timeout: Duration) -> Self {
        self.write = Some(timeout);
        self
    }

    /// Set the pool timeout.
    pub fn pool(mut self, timeout: Duration) -> Self {
        self.pool = Some(timeout);
        self
    }
}

impl From<Duration> for TimeoutConfig {
    fn from(timeout: Duration) -> Self {
        Self::all(timeout)
    }
}

/// Options handed to a transport alongside each request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Certificate verification mode.
    pub verify: Option<Verify>,

    /// Client certificate material.
    pub cert: Option<ClientCert>,

    /// Timeout budgets.
    pub timeout: Option<TimeoutConfig>,
}

impl DispatchOptions {
    /// Options which defer everything to the transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verification mode.
    pub fn verify(mut self, verify: impl Into<Verify>) -> Self {
        self.verify = Some(verify.into());
        self
    }

    /// Set the client certificate.
    pub fn cert(mut self, cert: ClientCert) -> Self {
        self.cert = Some(cert);
        self
    }

    /// Set the timeout budgets.
    pub fn timeout(mut self, timeout: impl Into<TimeoutConfig>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// True when no option is set, so the transport uses its defaults throughout.
    pub fn is_empty(&self) -> bool {
        self.verify.is_none() && self.cert.is_none() && self.timeout.is_none()
    }

    /// Fill each absent option from `defaults`. Options already set are kept.
    pub fn with_defaults(self, defaults: &DispatchOptions) -> Self {
        Self {
            verify: self.verify.or_else(|| defaults.verify.clone()),
            cert: self.cert.or_else(|| defaults.cert.clone()),
            timeout: self.timeout.or(defaults.timeout),
        }
    }
}
