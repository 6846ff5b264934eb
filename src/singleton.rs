/// A type that knows how to build its own singleton instance.
///
/// Implementing `Singleton` lets callers ask a registry for the instance with
/// the arguments they have at hand, as in
/// [`RegistryApi::instance`](crate::RegistryApi::instance). Only the caller that
/// actually constructs the instance has its `Args` used.
///
/// # Examples
///
/// ```rust
/// use lazy_singleton_registry::{Registry, RegistryApi, Singleton};
/// use std::convert::Infallible;
///
/// struct Greeter {
///     text: String,
/// }
///
/// impl Singleton for Greeter {
///     type Args = &'static str;
///     type Error = Infallible;
///
///     fn construct(text: Self::Args) -> Result<Self, Self::Error> {
///         Ok(Greeter { text: text.to_string() })
///     }
/// }
///
/// let registry = Registry::new();
/// let first = registry.instance::<Greeter>("hi").unwrap();
/// let second = registry.instance::<Greeter>("hello").unwrap();
///
/// assert_eq!(second.text, "hi");
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
pub trait Singleton: Sized + Send + Sync + 'static {
    /// Input to [`construct`](Singleton::construct).
    type Args;

    type Error;

    fn construct(args: Self::Args) -> Result<Self, Self::Error>;
}
