//! Format-agnostic object codecs with polymorphic dispatch.
//!
//! A data type opts in by implementing [`Codec`] for the drivers it supports,
//! usually generically over every [`FormatDriver`]. Handles to open type
//! families (`Box<dyn Base>`) are written with a [`TypeTag`] discriminator
//! and resolved back through a [`TypeRegistry`](registry::TypeRegistry), so
//! the base never has to enumerate its implementors.
//!
//! ## Menu
//!
//! - [`Codec`]: the per (type, driver) customization point.
//! - [`Tagged`], [`Polymorphic`], [`Upcast`]: identity of concrete types
//!   behind a base handle. See also [`impl_upcast!`].
//! - [`ErasedRef`]: checked type erasure at the registry boundary.
//! - [`registry`]: the polymorphic registry and its lifecycle.
//!   See also [`register_polymorphic!`].
//! - [`FormatDriver`]: the field operations codecs call, implemented by
//!   [`JsonDriver`].
//! - [`CodecError`]: every failure of the above.
//!
//! ## Example
//!
//! ```
//! use vc_codec::registry::TypeRegistry;
//! use vc_codec::{Codec, CodecError, FormatDriver, JsonDriver, Polymorphic, Tagged, impl_upcast};
//!
//! trait Shape: Polymorphic {
//!     fn area(&self) -> f64;
//! }
//!
//! #[derive(Default)]
//! struct Circle {
//!     radius: f64,
//! }
//!
//! impl Tagged for Circle {
//!     const TYPE_TAG: &'static str = "Circle";
//! }
//!
//! impl Shape for Circle {
//!     fn area(&self) -> f64 {
//!         3.0 * self.radius * self.radius
//!     }
//! }
//!
//! impl<D: FormatDriver> Codec<D> for Circle {
//!     fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
//!         driver.write_value("radius", &self.radius)
//!     }
//!     fn decode(&mut self, driver: &mut D) -> Result<(), CodecError> {
//!         driver.read_into("radius", &mut self.radius)
//!     }
//! }
//!
//! impl_upcast!(dyn Shape => Circle);
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<dyn Shape, Circle, JsonDriver>().unwrap();
//! let registry = registry.into();
//!
//! let mut writer = JsonDriver::in_memory(registry);
//! let shape: Box<dyn Shape> = Box::new(Circle { radius: 2.0 });
//! writer.write_polymorphic_value("shape", &*shape).unwrap();
//!
//! let text = writer.dump().unwrap();
//! assert_eq!(text, r#"{"shape":{"Type":"Circle","radius":2.0}}"#);
//!
//! let mut reader = JsonDriver::from_text(&text, writer.registry().clone()).unwrap();
//! let shape = reader.read_polymorphic::<dyn Shape>("shape").unwrap().unwrap();
//! assert_eq!(shape.area(), 12.0);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod codec;
mod erased;
mod error;
mod tag;

pub mod driver;
pub mod hash;
pub mod registry;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Exports

pub use codec::Codec;
pub use driver::{DriverOptions, FormatDriver, JsonDriver, MissingFieldPolicy};
pub use erased::ErasedRef;
pub use error::CodecError;
pub use registry::global;
pub use tag::{Polymorphic, Tagged, TypeTag, Upcast};
