//! Items used by the exported macros. Not public API.

#[cfg(feature = "auto_register")]
pub use inventory;

use crate::CodecError;
use crate::registry::TypeRegistry;

/// One link-time registration, submitted by [`register_polymorphic!`].
///
/// [`register_polymorphic!`]: crate::register_polymorphic
#[doc(hidden)]
pub struct AutoRegistration(pub fn(&mut TypeRegistry) -> Result<bool, CodecError>);

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegistration);

/// Submits a registration of `$derived` under `$base` for `$driver`.
///
/// The registration runs when [`TypeRegistry::auto_register`] is called, and
/// therefore on first access to [`global`](crate::global). It is a
/// module-level item, usually placed next to the type.
///
/// Without the `auto_register` feature the macro expands to nothing.
///
/// # Examples
///
/// ```
/// use vc_codec::registry::TypeRegistry;
/// use vc_codec::{Codec, CodecError, FormatDriver, JsonDriver, Polymorphic, Tagged};
/// use vc_codec::{impl_upcast, register_polymorphic};
///
/// trait Shape: Polymorphic {}
///
/// #[derive(Default)]
/// struct Dot;
///
/// impl Tagged for Dot {
///     const TYPE_TAG: &'static str = "Dot";
/// }
/// impl Shape for Dot {}
/// impl_upcast!(dyn Shape => Dot);
///
/// impl<D: FormatDriver> Codec<D> for Dot {
///     fn encode(&self, _: &mut D) -> Result<(), CodecError> { Ok(()) }
///     fn decode(&mut self, _: &mut D) -> Result<(), CodecError> { Ok(()) }
/// }
///
/// register_polymorphic!(dyn Shape, Dot, JsonDriver);
///
/// fn main() {
///     let mut registry = TypeRegistry::new();
///     registry.auto_register().unwrap();
///     assert!(registry.contains::<dyn Shape, JsonDriver>("Dot"));
/// }
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! register_polymorphic {
    ($base:ty, $derived:ty, $driver:ty $(,)?) => {
        const _: () = {
            fn __register(
                registry: &mut $crate::registry::TypeRegistry,
            ) -> ::core::result::Result<bool, $crate::CodecError> {
                registry.register::<$base, $derived, $driver>()
            }

            $crate::__macro_exports::inventory::submit! {
                $crate::__macro_exports::AutoRegistration(__register)
            }
        };
    };
}

/// Submits a registration of `$derived` under `$base` for `$driver`.
///
/// The `auto_register` feature is disabled, so this expands to nothing.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! register_polymorphic {
    ($base:ty, $derived:ty, $driver:ty $(,)?) => {};
}
