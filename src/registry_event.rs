/// Events emitted by a registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// A fast-path hit on an already constructed singleton emits nothing.
///
/// # Examples
///
/// ```rust
/// use lazy_singleton_registry::RegistryEvent;
///
/// let event = RegistryEvent::Construct { type_name: "i32" };
/// assert_eq!(event.to_string(), "construct { type_name: i32 }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// This caller won the construction lock on an empty slot and is about
    /// to run its constructor.
    Construct {
        /// The type name of the singleton (e.g., "i32", "alloc::string::String")
        type_name: &'static str,
    },

    /// The constructor succeeded and the instance is now published.
    Constructed { type_name: &'static str },

    /// The constructor returned an error.
    ConstructFailed {
        type_name: &'static str,
        /// Whether the failure poisoned the slot.
        poisoned: bool,
    },

    /// An existing instance was requested without constructing it.
    Get {
        type_name: &'static str,
        /// Whether an instance was available
        found: bool,
    },

    /// An initialization check was performed.
    Contains { type_name: &'static str, found: bool },
}

impl RegistryEvent {
    pub fn type_name(&self) -> &'static str {
        match *self {
            RegistryEvent::Construct { type_name }
            | RegistryEvent::Constructed { type_name }
            | RegistryEvent::ConstructFailed { type_name, .. }
            | RegistryEvent::Get { type_name, .. }
            | RegistryEvent::Contains { type_name, .. } => type_name,
        }
    }
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Construct { type_name } => {
                write!(f, "construct {{ type_name: {} }}", type_name)
            }
            RegistryEvent::Constructed { type_name } => {
                write!(f, "constructed {{ type_name: {} }}", type_name)
            }
            RegistryEvent::ConstructFailed {
                type_name,
                poisoned,
            } => {
                write!(
                    f,
                    "construct_failed {{ type_name: {}, poisoned: {} }}",
                    type_name, poisoned
                )
            }
            RegistryEvent::Get { type_name, found } => {
                write!(f, "get {{ type_name: {}, found: {} }}", type_name, found)
            }
            RegistryEvent::Contains { type_name, found } => {
                write!(
                    f,
                    "contains {{ type_name: {}, found: {} }}",
                    type_name, found
                )
            }
        }
    }
}
