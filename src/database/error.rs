//! Error taxonomy for the host registry.

/// Domain errors surfaced by registry operations.
///
/// `DuplicateHost` and `HostNotFound` carry enough context to be rendered
/// directly in a chat message; everything unexpected collapses into
/// `Storage`.
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// A host with this IP address is already registered (hosts.ip is
    /// globally unique).
    DuplicateHost { ip: String },
    /// No host row matches the given IP address.
    HostNotFound { ip: String },
    /// `find_host` was called without an id and without an ip.
    MissingSelector,
    /// Any other persistence failure (pool, SQL, serialization).
    Storage(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateHost { ip } => {
                write!(f, "A host with IP {} already exists", ip)
            }
            RegistryError::HostNotFound { ip } => {
                write!(f, "No host with IP {} is registered", ip)
            }
            RegistryError::MissingSelector => {
                write!(f, "Either a host id or a host ip must be provided")
            }
            RegistryError::Storage(detail) => write!(f, "Storage error: {}", detail),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<rusqlite::Error> for RegistryError {
    fn from(e: rusqlite::Error) -> Self {
        RegistryError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for RegistryError {
    fn from(e: r2d2::Error) -> Self {
        RegistryError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(e: serde_json::Error) -> Self {
        RegistryError::Storage(e.to_string())
    }
}
