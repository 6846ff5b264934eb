/// Errors raised by the registry itself, independent of any constructor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to acquire registry lock")]
    RegistryLock,
    #[error("Type mismatch in registry: {type_name}")]
    TypeMismatch { type_name: &'static str },
    #[error("Type not initialized in registry: {type_name}")]
    TypeNotFound { type_name: &'static str },
}

/// Error returned by every initializing accessor.
///
/// `E` is the error type of the constructor. Only the caller that actually
/// ran the constructor ever sees [`InitError::Construction`]; the value it
/// carries is the constructor's own error.
#[derive(Debug, thiserror::Error)]
pub enum InitError<E> {
    /// The constructor returned an error. The slot is left empty.
    #[error("failed to construct singleton `{type_name}`")]
    Construction {
        type_name: &'static str,
        #[source]
        source: E,
    },

    /// An earlier construction failed under [`FailurePolicy::Poison`](crate::FailurePolicy::Poison).
    #[error("singleton `{type_name}` is poisoned by an earlier failed construction")]
    Poisoned { type_name: &'static str },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl<E> InitError<E> {
    /// Name of the singleton type the error refers to.
    pub fn type_name(&self) -> &'static str {
        match *self {
            InitError::Construction { type_name, .. } | InitError::Poisoned { type_name } => {
                type_name
            }
            InitError::Registry(
                RegistryError::TypeMismatch { type_name } | RegistryError::TypeNotFound { type_name },
            ) => type_name,
            InitError::Registry(RegistryError::RegistryLock) => "<registry>",
        }
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self, InitError::Poisoned { .. })
    }

    /// Returns the constructor's error, if that is what failed.
    pub fn into_source(self) -> Option<E> {
        match self {
            InitError::Construction { source, .. } => Some(source),
            _ => None,
        }
    }
}
