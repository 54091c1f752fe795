use safe_primitives::rpc::CallError;

#[derive(Debug, thiserror::Error)]
pub enum EnsError {
    #[error("Name '{0}' contains invalid characters")]
    InvalidCharacters(String),

    #[error("Name '{0}' is not registered")]
    NameNotRegistered(String),

    #[error("Resolver for '{0}' does not support address resolution")]
    UnsupportedResolver(String),

    #[error("No address is set for '{0}'")]
    AddressNotFound(String),

    #[error(transparent)]
    Transport(#[from] CallError),
}
