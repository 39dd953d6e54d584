//! Format drivers: the façade user codecs write and read through.
//!
//! ## Menu
//!
//! - [`FormatDriver`]: the operations a [`Codec`] may call.
//! - [`JsonDriver`]: the JSON driver over a [`Session`](vc_document::Session).
//! - [`DriverOptions`] and [`MissingFieldPolicy`]: runtime options.

// -----------------------------------------------------------------------------
// Modules

mod json;
mod options;
mod tag_stack;

// -----------------------------------------------------------------------------
// Exports

pub use json::JsonDriver;
pub use options::{DriverOptions, MissingFieldPolicy};

// -----------------------------------------------------------------------------
// FormatDriver

use serde::Serialize;
use serde::de::DeserializeOwned;
use vc_document::FieldPath;

use crate::registry::TypeRegistryArc;
use crate::{Codec, CodecError, ErasedRef, Polymorphic};
use tag_stack::{TagScope, traced};

/// A serialization format bound to one open document.
///
/// The required methods are the primitive field operations of the format,
/// all relative to the current [`path`](FormatDriver::path). The provided
/// methods build objects, optional objects and polymorphic handles on top of
/// them and are not meant to be overridden.
///
/// Every provided method leaves the path as it found it, including when it
/// returns an error.
pub trait FormatDriver: Sized + 'static {
    /// Key of the polymorphic discriminator.
    const TYPE_KEY: &'static str = "Type";

    /// The registry polymorphic handles are resolved in.
    fn registry(&self) -> &TypeRegistryArc;

    fn options(&self) -> &DriverOptions;

    /// The current field path.
    fn path(&self) -> &FieldPath;

    /// Descends into the named child. Prefer [`with_field`](FormatDriver::with_field).
    fn push(&mut self, name: &str);

    /// Ascends to the parent.
    fn pop(&mut self);

    /// Whether the named field exists, `null` included.
    fn has_field(&self, name: &str) -> bool;

    /// Whether the named field exists and is `null`.
    fn is_null(&self, name: &str) -> bool;

    /// Whether the named field exists and is an object.
    fn is_object(&self, name: &str) -> bool;

    /// Writes `null` into the named field.
    fn write_null(&mut self, name: &str) -> Result<(), CodecError>;

    /// Makes the named field an object, keeping its keys if it already is one.
    fn begin_object(&mut self, name: &str) -> Result<(), CodecError>;

    /// Removes the named field if it exists.
    fn remove_field(&mut self, name: &str) -> Result<(), CodecError>;

    /// Writes a leaf value (scalar, string, sequence or map) into the named field.
    fn write_value<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), CodecError>;

    /// Reads a leaf value from the named field, `None` if the field is absent.
    fn read_value_opt<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, CodecError>;

    // -------------------------------------------------------------------------
    // Provided

    /// Runs `f` with the named field as the current path.
    fn with_field<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self) -> Result<R, CodecError>,
    ) -> Result<R, CodecError> {
        self.push(name);
        let result = f(self);
        self.pop();
        result
    }

    /// Applies the [`MissingFieldPolicy`] to the absent field `name`.
    fn missing(&self, name: &str) -> Result<(), CodecError> {
        let path = self.path().join(name);
        match self.options().missing_fields {
            MissingFieldPolicy::Default => {
                log::debug!("field `{path}` is missing, keeping the default");
                Ok(())
            }
            MissingFieldPolicy::Error => Err(traced(CodecError::MissingField { path })),
        }
    }

    /// Fails with [`CodecError::NotAnObject`] unless `name` holds an object.
    fn expect_object(&self, name: &str) -> Result<(), CodecError> {
        if self.is_object(name) {
            return Ok(());
        }
        Err(traced(CodecError::NotAnObject {
            path: self.path().join(name),
        }))
    }

    /// Reads a leaf value, falling back to `T::default()` for an absent field.
    fn read_value<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, CodecError> {
        match self.read_value_opt(name)? {
            Some(value) => Ok(value),
            None => {
                self.missing(name)?;
                Ok(T::default())
            }
        }
    }

    /// Reads a leaf value into `out`, leaving it untouched for an absent field.
    fn read_into<T: DeserializeOwned>(&self, name: &str, out: &mut T) -> Result<(), CodecError> {
        match self.read_value_opt(name)? {
            Some(value) => *out = value,
            None => self.missing(name)?,
        }
        Ok(())
    }

    /// Reads a leaf value that must be present, whatever the policy.
    fn read_required<T: DeserializeOwned>(&self, name: &str) -> Result<T, CodecError> {
        self.read_value_opt(name)?.ok_or_else(|| {
            traced(CodecError::MissingField {
                path: self.path().join(name),
            })
        })
    }

    /// Writes `value` as a nested object.
    fn write_object<T: Codec<Self> + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), CodecError> {
        self.begin_object(name)?;
        self.with_field(name, |driver| value.encode(driver))
    }

    /// Decodes the nested object `name` into `value`.
    ///
    /// An absent or `null` field is handed to [`missing`](FormatDriver::missing).
    /// Any other non-object value fails with [`CodecError::NotAnObject`].
    fn read_object<T: Codec<Self> + ?Sized>(&mut self, name: &str, value: &mut T) -> Result<(), CodecError> {
        if !self.has_field(name) || self.is_null(name) {
            return self.missing(name);
        }
        self.expect_object(name)?;
        self.with_field(name, |driver| value.decode(driver))
    }

    /// Writes an optional object, `None` as `null`.
    fn write_optional<T: Codec<Self> + ?Sized>(
        &mut self,
        name: &str,
        value: Option<&T>,
    ) -> Result<(), CodecError> {
        match value {
            Some(value) => self.write_object(name, value),
            None => self.write_null(name),
        }
    }

    /// Reads an optional object; `null` gives `None`.
    ///
    /// Any other non-object value fails with [`CodecError::NotAnObject`].
    fn read_optional<T: Codec<Self> + Default>(&mut self, name: &str) -> Result<Option<T>, CodecError> {
        if !self.has_field(name) {
            self.missing(name)?;
            return Ok(None);
        }
        if self.is_null(name) {
            return Ok(None);
        }
        self.expect_object(name)?;

        let mut value = T::default();
        self.with_field(name, |driver| value.decode(driver))?;
        Ok(Some(value))
    }

    /// Writes a handle through its base `B`, `None` as `null`.
    ///
    /// The concrete type is looked up by its tag in the (`B`, `Self`) scope
    /// of the registry. The object starts with the [`TYPE_KEY`] discriminator,
    /// followed by whatever the concrete [`Codec`] writes.
    ///
    /// Fails with [`CodecError::UnregisteredType`] before anything is written
    /// if the concrete type is not registered. If the concrete [`Codec`]
    /// fails, the partly written field is removed again.
    ///
    /// [`TYPE_KEY`]: FormatDriver::TYPE_KEY
    fn write_polymorphic<B: ?Sized + Polymorphic>(
        &mut self,
        name: &str,
        value: Option<&B>,
    ) -> Result<(), CodecError> {
        let Some(value) = value else {
            return self.write_null(name);
        };

        let tag = value.type_tag();
        let entry = self.registry().read().handler::<B, Self>(tag).map_err(traced)?;
        let _scope = TagScope::enter(tag);

        self.begin_object(name)?;
        let result = self.with_field(name, |driver| {
            driver.write_value(Self::TYPE_KEY, tag)?;
            entry.encode(driver, ErasedRef::new(value))
        });
        if result.is_err() {
            self.remove_field(name)?;
        }
        result
    }

    /// Writes a present handle through its base `B`.
    #[inline]
    fn write_polymorphic_value<B: ?Sized + Polymorphic>(
        &mut self,
        name: &str,
        value: &B,
    ) -> Result<(), CodecError> {
        self.write_polymorphic(name, Some(value))
    }

    /// Reads a handle through its base `B`.
    ///
    /// `null` gives `Ok(None)` without running any registered function; an
    /// absent field is handed to [`missing`](FormatDriver::missing) first.
    /// Otherwise the [`TYPE_KEY`] discriminator selects the registered
    /// concrete type, which is default-constructed, decoded and returned as
    /// an owned `Box<B>`.
    ///
    /// [`TYPE_KEY`]: FormatDriver::TYPE_KEY
    fn read_polymorphic<B: ?Sized + Polymorphic>(&mut self, name: &str) -> Result<Option<Box<B>>, CodecError> {
        if !self.has_field(name) {
            self.missing(name)?;
            return Ok(None);
        }
        if self.is_null(name) {
            return Ok(None);
        }
        self.expect_object(name)?;

        self.with_field(name, |driver| {
            let Some(tag) = driver.read_value_opt::<String>(Self::TYPE_KEY)? else {
                return Err(traced(CodecError::MissingField {
                    path: driver.path().join(Self::TYPE_KEY),
                }));
            };

            let entry = driver.registry().read().handler::<B, Self>(&tag).map_err(traced)?;
            let _scope = TagScope::enter(entry.tag());

            let value = entry.decode(driver)?;
            let found = (*value).type_tag();
            if found != entry.tag() {
                return Err(traced(CodecError::TypeMismatch {
                    expected: entry.tag(),
                    found,
                }));
            }
            Ok(Some(value))
        })
    }
}
