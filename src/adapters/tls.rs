//! Broker trust policy for the MQTT-over-TLS transport.
//!
//! | Policy             | Server certificate check                      |
//! |--------------------|-----------------------------------------------|
//! | `CertificateBundle`| ESP-IDF's built-in CA bundle (default)        |
//! | `PinnedAuthority`  | a single CA given as NUL-terminated PEM       |
//! | `AcceptAny`        | none (needs insecure mbedTLS sdkconfig)       |

use core::fmt;

use crate::error::ConfigError;

const PEM_HEADER: &str = "-----BEGIN CERTIFICATE-----";

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum TrustPolicy {
    /// Skip server verification. Development brokers only.
    AcceptAny,
    /// Verify against one CA certificate. The PEM text must end in `\0`
    /// because mbedTLS reads it as a C string.
    PinnedAuthority(&'static str),
    #[default]
    CertificateBundle,
}

impl fmt::Debug for TrustPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AcceptAny => write!(f, "AcceptAny"),
            Self::PinnedAuthority(pem) => write!(f, "PinnedAuthority({}B)", pem.len()),
            Self::CertificateBundle => write!(f, "CertificateBundle"),
        }
    }
}

impl TrustPolicy {
    /// Pin a CA certificate, checking it looks like NUL-terminated PEM.
    pub fn pinned(pem: &'static str) -> Result<Self, ConfigError> {
        if !pem.ends_with('\0') {
            return Err(ConfigError::ValidationFailed(
                "pinned CA PEM must be NUL-terminated",
            ));
        }
        if !pem.trim_start().starts_with(PEM_HEADER) {
            return Err(ConfigError::ValidationFailed(
                "pinned CA is not a PEM certificate",
            ));
        }
        Ok(Self::PinnedAuthority(pem))
    }

    /// Policy baked in at build time via `BRAILLECELL_MQTT_TRUST`
    /// (`bundle` or `any`). Unset means `bundle`.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::parse(option_env!("BRAILLECELL_MQTT_TRUST"))
    }

    fn parse(value: Option<&str>) -> Result<Self, ConfigError> {
        match value {
            None | Some("bundle") => Ok(Self::CertificateBundle),
            Some("any") => Ok(Self::AcceptAny),
            Some(_) => Err(ConfigError::ValidationFailed(
                "BRAILLECELL_MQTT_TRUST must be 'bundle' or 'any'",
            )),
        }
    }

    pub fn verifies_server(&self) -> bool {
        !matches!(self, Self::AcceptAny)
    }
}
