use std::sync::LazyLock;

use crate::registry::{TypeRegistry, TypeRegistryArc};

static GLOBAL: LazyLock<TypeRegistryArc> = LazyLock::new(|| {
    let mut registry = TypeRegistry::new();
    if let Err(e) = registry.auto_register() {
        log::error!("auto registration into the global registry failed: {e}");
    }
    TypeRegistryArc::new(registry)
});

/// The process-wide registry.
///
/// Initialized on first access with every registration submitted through
/// [`register_polymorphic!`](crate::register_polymorphic). More types can be
/// registered later through [`TypeRegistryArc::write`].
///
/// Drivers created with [`JsonDriver::writer`](crate::JsonDriver::writer) and
/// friends take any [`TypeRegistryArc`]; pass `global().clone()` to use this one.
#[inline]
pub fn global() -> &'static TypeRegistryArc {
    &GLOBAL
}
