use crate::{CodecError, FormatDriver};

// -----------------------------------------------------------------------------
// Codec

/// The customization point of one data type for one [`FormatDriver`].
///
/// Implementations only go through the driver's public operations, they never
/// touch the document tree directly:
///
/// - scalars, strings and sequences: [`write_value`] / [`read_value`]
/// - nested objects: [`write_object`] / [`read_object`]
/// - optional objects: [`write_optional`] / [`read_optional`]
/// - owned polymorphic handles: [`write_polymorphic`] / [`read_polymorphic`]
///
/// A type that extends another one by composition encodes the embedded base
/// first and its own fields afterwards, and decodes in the same order, so
/// base fields precede derived fields in the document.
///
/// # Examples
///
/// ```
/// use vc_codec::{Codec, CodecError, FormatDriver};
///
/// #[derive(Default)]
/// struct Foo {
///     x: i32,
/// }
///
/// #[derive(Default)]
/// struct Bar {
///     base: Foo,
///     y: i32,
/// }
///
/// impl<D: FormatDriver> Codec<D> for Foo {
///     fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
///         driver.write_value("x", &self.x)
///     }
///
///     fn decode(&mut self, driver: &mut D) -> Result<(), CodecError> {
///         driver.read_into("x", &mut self.x)
///     }
/// }
///
/// impl<D: FormatDriver> Codec<D> for Bar {
///     fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
///         self.base.encode(driver)?;
///         driver.write_value("y", &self.y)
///     }
///
///     fn decode(&mut self, driver: &mut D) -> Result<(), CodecError> {
///         self.base.decode(driver)?;
///         driver.read_into("y", &mut self.y)
///     }
/// }
/// ```
///
/// [`write_value`]: FormatDriver::write_value
/// [`read_value`]: FormatDriver::read_value
/// [`write_object`]: FormatDriver::write_object
/// [`read_object`]: FormatDriver::read_object
/// [`write_optional`]: FormatDriver::write_optional
/// [`read_optional`]: FormatDriver::read_optional
/// [`write_polymorphic`]: FormatDriver::write_polymorphic
/// [`read_polymorphic`]: FormatDriver::read_polymorphic
pub trait Codec<D: FormatDriver> {
    /// Writes every field of `self` at the driver's current path.
    fn encode(&self, driver: &mut D) -> Result<(), CodecError>;

    /// Reads every field of `self` from the driver's current path.
    fn decode(&mut self, driver: &mut D) -> Result<(), CodecError>;
}

impl<D: FormatDriver, T: Codec<D> + ?Sized> Codec<D> for Box<T> {
    #[inline]
    fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
        (**self).encode(driver)
    }

    #[inline]
    fn decode(&mut self, driver: &mut D) -> Result<(), CodecError> {
        (**self).decode(driver)
    }
}
