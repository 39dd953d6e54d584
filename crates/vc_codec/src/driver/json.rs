use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned};
use serde_json::{Map, Value};
use vc_document::{Document, DocumentStore, FieldPath, Mode, Session};

use crate::registry::TypeRegistryArc;
use crate::{CodecError, DriverOptions, FormatDriver};

// -----------------------------------------------------------------------------
// JsonDriver

/// The JSON [`FormatDriver`].
///
/// Owns one [`Session`] and a handle to the registry polymorphic fields are
/// resolved in. Dropping the driver drops the session, which flushes a write
/// session exactly once.
///
/// # Examples
///
/// ```
/// use vc_codec::registry::TypeRegistryArc;
/// use vc_codec::{FormatDriver, JsonDriver};
///
/// let mut writer = JsonDriver::in_memory(TypeRegistryArc::default());
/// writer.write_value("name", "sensor").unwrap();
/// writer.write_value("samples", &[1, 2, 3]).unwrap();
///
/// let text = writer.dump().unwrap();
/// assert_eq!(text, r#"{"name":"sensor","samples":[1,2,3]}"#);
///
/// let reader = JsonDriver::from_text(&text, TypeRegistryArc::default()).unwrap();
/// let samples: Vec<i32> = reader.read_value("samples").unwrap();
/// assert_eq!(samples, [1, 2, 3]);
/// ```
#[derive(Debug)]
pub struct JsonDriver {
    session: Session,
    registry: TypeRegistryArc,
    options: DriverOptions,
}

impl JsonDriver {
    /// Creates a driver over an open session.
    #[inline]
    pub fn new(session: Session, registry: TypeRegistryArc) -> Self {
        Self {
            session,
            registry,
            options: DriverOptions::new(),
        }
    }

    #[inline]
    pub fn with_options(mut self, options: DriverOptions) -> Self {
        self.options = options;
        self
    }

    /// Opens a write session over `store`.
    #[inline]
    pub fn writer(store: impl DocumentStore + 'static, registry: TypeRegistryArc) -> Self {
        Self::new(Session::open_write(store), registry)
    }

    /// Opens a read session over `store`, parsing the stored text.
    #[inline]
    pub fn reader(
        store: impl DocumentStore + 'static,
        registry: TypeRegistryArc,
    ) -> Result<Self, CodecError> {
        Ok(Self::new(Session::open_read(store)?, registry))
    }

    /// A write session without storage, read back with [`dump`](Self::dump).
    #[inline]
    pub fn in_memory(registry: TypeRegistryArc) -> Self {
        Self::new(Session::in_memory(Document::new(), Mode::Write), registry)
    }

    /// A read session over `text`.
    #[inline]
    pub fn from_text(text: &str, registry: TypeRegistryArc) -> Result<Self, CodecError> {
        Ok(Self::new(Session::from_text(text)?, registry))
    }

    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[inline]
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[inline]
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Merges the document of `other` into this one.
    #[inline]
    pub fn merge(&mut self, other: &JsonDriver) -> Result<(), CodecError> {
        Ok(self.session.merge(&other.session)?)
    }

    /// Returns the document text.
    #[inline]
    pub fn dump(&self) -> Result<String, CodecError> {
        Ok(self.session.dump()?)
    }

    /// Flushes and closes the session. See [`Session::close`].
    #[inline]
    pub fn close(&mut self) -> Result<(), CodecError> {
        Ok(self.session.close()?)
    }

    fn invalid(&self, name: &str, source: serde_json::Error) -> CodecError {
        CodecError::InvalidValue {
            path: self.session.path().join(name),
            source,
        }
    }
}

impl FormatDriver for JsonDriver {
    #[inline]
    fn registry(&self) -> &TypeRegistryArc {
        &self.registry
    }

    #[inline]
    fn options(&self) -> &DriverOptions {
        &self.options
    }

    #[inline]
    fn path(&self) -> &FieldPath {
        self.session.path()
    }

    #[inline]
    fn push(&mut self, name: &str) {
        self.session.push(name);
    }

    #[inline]
    fn pop(&mut self) {
        self.session.pop();
    }

    #[inline]
    fn has_field(&self, name: &str) -> bool {
        self.session.get(name).is_some()
    }

    #[inline]
    fn is_null(&self, name: &str) -> bool {
        self.session.get(name).is_some_and(Value::is_null)
    }

    #[inline]
    fn is_object(&self, name: &str) -> bool {
        self.session.get(name).is_some_and(Value::is_object)
    }

    fn write_null(&mut self, name: &str) -> Result<(), CodecError> {
        Ok(self.session.set(name, Value::Null)?)
    }

    fn begin_object(&mut self, name: &str) -> Result<(), CodecError> {
        let field = self.session.field_mut(Some(name))?;
        if !field.is_object() {
            *field = Value::Object(Map::new());
        }
        Ok(())
    }

    fn remove_field(&mut self, name: &str) -> Result<(), CodecError> {
        self.session.remove(name)?;
        Ok(())
    }

    fn write_value<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), CodecError> {
        let value = serde_json::to_value(value).map_err(|e| self.invalid(name, e))?;
        Ok(self.session.set(name, value)?)
    }

    fn read_value_opt<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, CodecError> {
        match self.session.get(name) {
            Some(value) => <T as Deserialize>::deserialize(value)
                .map(Some)
                .map_err(|e| self.invalid(name, e)),
            None => Ok(None),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::collections::BTreeMap;

    use vc_document::{DocumentError, MemoryStore};

    use super::JsonDriver;
    use crate::registry::{TypeRegistry, TypeRegistryArc};
    use crate::{Codec, CodecError, DriverOptions, ErasedRef, FormatDriver};
    use crate::{Polymorphic, Tagged, impl_upcast};

    trait Base: Polymorphic {}

    #[derive(Debug, Default, PartialEq)]
    struct Foo {
        x: i32,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Bar {
        base: Foo,
        y: i32,
    }

    // Never registered.
    #[derive(Debug, Default)]
    struct Baz;

    impl Tagged for Foo {
        const TYPE_TAG: &'static str = "Foo";
    }
    impl Tagged for Bar {
        const TYPE_TAG: &'static str = "Bar";
    }
    impl Tagged for Baz {
        const TYPE_TAG: &'static str = "Baz";
    }

    impl Base for Foo {}
    impl Base for Bar {}
    impl Base for Baz {}

    impl_upcast!(dyn Base => Foo, Bar, Baz);

    impl<D: FormatDriver> Codec<D> for Foo {
        fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
            driver.write_value("x", &self.x)
        }

        fn decode(&mut self, driver: &mut D) -> Result<(), CodecError> {
            driver.read_into("x", &mut self.x)
        }
    }

    impl<D: FormatDriver> Codec<D> for Bar {
        fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
            self.base.encode(driver)?;
            driver.write_value("y", &self.y)
        }

        fn decode(&mut self, driver: &mut D) -> Result<(), CodecError> {
            self.base.decode(driver)?;
            driver.read_into("y", &mut self.y)
        }
    }

    impl<D: FormatDriver> Codec<D> for Baz {
        fn encode(&self, _: &mut D) -> Result<(), CodecError> {
            Ok(())
        }

        fn decode(&mut self, _: &mut D) -> Result<(), CodecError> {
            Ok(())
        }
    }

    fn registry() -> TypeRegistryArc {
        let mut registry = TypeRegistry::new();
        registry.register::<dyn Base, Foo, JsonDriver>().unwrap();
        registry.register::<dyn Base, Bar, JsonDriver>().unwrap();
        registry.into()
    }

    fn reader(text: &str) -> JsonDriver {
        JsonDriver::from_text(text, registry()).unwrap()
    }

    #[test]
    fn scalars_and_arrays() {
        let mut writer = JsonDriver::in_memory(registry());
        writer.write_value("count", &42_u32).unwrap();
        writer.write_value("ratio", &0.5_f64).unwrap();
        writer.write_value("name", "sensor").unwrap();
        writer.write_value("flags", &[true, false]).unwrap();
        writer.write_value("grid", &vec![vec![1, 2], vec![3]]).unwrap();

        let text = writer.dump().unwrap();
        assert_eq!(
            text,
            r#"{"count":42,"ratio":0.5,"name":"sensor","flags":[true,false],"grid":[[1,2],[3]]}"#
        );

        let reader = reader(&text);
        assert_eq!(reader.read_value::<u32>("count").unwrap(), 42);
        assert_eq!(reader.read_value::<f64>("ratio").unwrap(), 0.5);
        assert_eq!(reader.read_value::<String>("name").unwrap(), "sensor");
        assert_eq!(reader.read_value::<[bool; 2]>("flags").unwrap(), [true, false]);
        assert_eq!(reader.read_value::<Vec<Vec<i32>>>("grid").unwrap(), [vec![1, 2], vec![3]]);
    }

    #[test]
    fn plain_object_keeps_base_first() {
        let mut writer = JsonDriver::in_memory(registry());
        let bar = Bar {
            base: Foo { x: 1 },
            y: 2,
        };
        writer.write_object("bar", &bar).unwrap();
        assert!(writer.path().is_empty());

        let text = writer.dump().unwrap();
        assert_eq!(text, r#"{"bar":{"x":1,"y":2}}"#);

        let mut decoded = Bar::default();
        reader(&text).read_object("bar", &mut decoded).unwrap();
        assert_eq!(decoded, bar);
    }

    #[test]
    fn polymorphic_layout() {
        let mut writer = JsonDriver::in_memory(registry());
        let value: Box<dyn Base> = Box::new(Bar {
            base: Foo { x: 200 },
            y: 300,
        });
        writer.write_polymorphic("obj", Some(&*value)).unwrap();

        let text = writer.dump().unwrap();
        assert_eq!(text, r#"{"obj":{"Type":"Bar","x":200,"y":300}}"#);

        let decoded = reader(&text).read_polymorphic::<dyn Base>("obj").unwrap().unwrap();
        assert_eq!(decoded.type_tag(), "Bar");
        let bar = decoded.as_any().downcast_ref::<Bar>().unwrap();
        assert_eq!(bar.base.x, 200);
        assert_eq!(bar.y, 300);
    }

    #[test]
    fn polymorphic_base_type() {
        let mut writer = JsonDriver::in_memory(registry());
        writer.write_polymorphic_value::<dyn Base>("a", &Foo { x: 7 }).unwrap();

        let decoded = reader(&writer.dump().unwrap())
            .read_polymorphic::<dyn Base>("a")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.as_any().downcast_ref::<Foo>(), Some(&Foo { x: 7 }));
    }

    static DECODED: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Counted;

    impl Tagged for Counted {
        const TYPE_TAG: &'static str = "Counted";
    }
    impl Base for Counted {}
    impl_upcast!(dyn Base => Counted);

    impl<D: FormatDriver> Codec<D> for Counted {
        fn encode(&self, _: &mut D) -> Result<(), CodecError> {
            Ok(())
        }

        fn decode(&mut self, _: &mut D) -> Result<(), CodecError> {
            DECODED.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn null_round_trip() {
        let registry = registry();
        registry
            .write()
            .register::<dyn Base, Counted, JsonDriver>()
            .unwrap();

        let mut writer = JsonDriver::in_memory(registry.clone());
        writer.write_polymorphic::<dyn Base>("obj", None).unwrap();
        let text = writer.dump().unwrap();
        assert_eq!(text, r#"{"obj":null}"#);

        let mut reader = JsonDriver::from_text(&text, registry).unwrap();
        assert!(reader.read_polymorphic::<dyn Base>("obj").unwrap().is_none());
        assert_eq!(DECODED.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn unregistered_type_writes_nothing() {
        let mut writer = JsonDriver::in_memory(registry());
        let err = writer.write_polymorphic_value::<dyn Base>("obj", &Baz).unwrap_err();

        assert!(err.is_unregistered());
        assert!(!writer.has_field("obj"));
        assert!(writer.path().is_empty());
    }

    #[test]
    fn unregistered_type_leaves_handle_empty() {
        let mut reader = reader(r#"{"obj":{"Type":"Baz"}}"#);

        let err = reader.read_polymorphic::<dyn Base>("obj").err().expect("expected an error");
        assert!(err.is_unregistered());
        assert!(reader.path().is_empty());
    }

    // Writes a field, then fails.
    #[derive(Default)]
    struct Faulty;

    impl Tagged for Faulty {
        const TYPE_TAG: &'static str = "Faulty";
    }
    impl Base for Faulty {}
    impl_upcast!(dyn Base => Faulty);

    impl<D: FormatDriver> Codec<D> for Faulty {
        fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
            driver.write_value("x", &1)?;
            Err(CodecError::MissingField {
                path: driver.path().join("y"),
            })
        }

        fn decode(&mut self, _: &mut D) -> Result<(), CodecError> {
            Ok(())
        }
    }

    #[test]
    fn failed_polymorphic_write_leaves_field_absent() {
        let registry = registry();
        registry.write().register::<dyn Base, Faulty, JsonDriver>().unwrap();

        let mut writer = JsonDriver::in_memory(registry);
        writer.write_value("before", &0).unwrap();
        let err = writer.write_polymorphic_value::<dyn Base>("obj", &Faulty).unwrap_err();

        assert!(err.is_missing_field());
        assert!(!writer.has_field("obj"));
        assert!(writer.path().is_empty());
        assert_eq!(writer.dump().unwrap(), r#"{"before":0}"#);
    }

    #[test]
    fn missing_discriminator() {
        let mut reader = reader(r#"{"obj":{"x":1}}"#);
        let err = reader.read_polymorphic::<dyn Base>("obj").err().expect("expected an error");

        match err {
            CodecError::MissingField { path } => assert_eq!(path.to_string(), "/obj/Type"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn erasure_boundary_rejects_other_types() {
        let registry = registry();
        let entry = registry.read().handler::<dyn Base, JsonDriver>("Foo").unwrap();

        let mut writer = JsonDriver::in_memory(registry.clone());
        let bar = Bar::default();
        let err = entry.encode(&mut writer, ErasedRef::new(&bar)).unwrap_err();

        assert!(err.is_type_mismatch());
        assert!(!writer.has_field("x"));
    }

    #[test]
    fn missing_field_policy() {
        let lenient = reader(r#"{"x":1}"#);
        assert_eq!(lenient.read_value::<i32>("y").unwrap(), 0);

        let mut kept = 5;
        lenient.read_into("y", &mut kept).unwrap();
        assert_eq!(kept, 5);

        let strict = reader(r#"{"x":1}"#).with_options(DriverOptions::strict());
        let err = strict.read_value::<i32>("y").unwrap_err();
        assert!(err.is_missing_field());
        assert_eq!(err.to_string(), "field `/y` is missing");

        assert!(lenient.read_required::<i32>("y").unwrap_err().is_missing_field());
    }

    #[test]
    fn invalid_value_reports_path() {
        let mut reader = reader(r#"{"obj":{"Type":"Foo","x":"text"}}"#);
        let err = reader.read_polymorphic::<dyn Base>("obj").err().expect("expected an error");

        match err {
            CodecError::InvalidValue { path, .. } => assert_eq!(path.to_string(), "/obj/x"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(reader.path().is_empty());
    }

    #[test]
    fn optional_objects() {
        let mut writer = JsonDriver::in_memory(registry());
        writer.write_optional("some", Some(&Foo { x: 3 })).unwrap();
        writer.write_optional::<Foo>("none", None).unwrap();

        let text = writer.dump().unwrap();
        assert_eq!(text, r#"{"some":{"x":3},"none":null}"#);

        let mut reader = reader(&text);
        assert_eq!(reader.read_optional::<Foo>("some").unwrap(), Some(Foo { x: 3 }));
        assert_eq!(reader.read_optional::<Foo>("none").unwrap(), None);
        assert_eq!(reader.read_optional::<Foo>("absent").unwrap(), None);
    }

    #[test]
    fn non_object_fields_are_rejected() {
        let mut reader = reader(r#"{"n":5,"s":"text","obj":[1]}"#);

        let err = reader.read_optional::<Foo>("n").unwrap_err();
        assert!(err.is_not_an_object());
        assert_eq!(err.to_string(), "field `/n` is not an object");

        let mut foo = Foo { x: 4 };
        let err = reader.read_object("s", &mut foo).unwrap_err();
        match err {
            CodecError::NotAnObject { path } => assert_eq!(path.to_string(), "/s"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(foo, Foo { x: 4 });

        let err = reader.read_polymorphic::<dyn Base>("obj").err().expect("expected an error");
        assert!(err.is_not_an_object());
        assert!(reader.path().is_empty());
    }

    #[test]
    fn nullable_scalars() {
        let mut writer = JsonDriver::in_memory(registry());
        writer.write_value("none", &None::<i32>).unwrap();
        writer.write_value("some", &Some(5)).unwrap();

        let text = writer.dump().unwrap();
        assert_eq!(text, r#"{"none":null,"some":5}"#);

        let reader = reader(&text);
        assert_eq!(reader.read_value::<Option<i32>>("none").unwrap(), None);
        assert_eq!(reader.read_value::<Option<i32>>("some").unwrap(), Some(5));
    }

    #[test]
    fn maps_are_leaf_values() {
        let mut writer = JsonDriver::in_memory(registry());
        let map = BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 2)]);
        writer.write_value("map", &map).unwrap();

        let decoded: BTreeMap<String, i32> = reader(&writer.dump().unwrap()).read_value("map").unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn read_session_rejects_writes() {
        let mut reader = reader("{}");
        let err = reader.write_value("x", &1).unwrap_err();
        assert!(matches!(err, CodecError::Document(DocumentError::WrongMode { .. })));
    }

    #[test]
    fn store_round_trip() {
        let store = MemoryStore::new();

        let mut writer = JsonDriver::writer(store.clone(), registry());
        writer.write_polymorphic_value::<dyn Base>("obj", &Foo { x: 9 }).unwrap();
        drop(writer);
        assert_eq!(store.store_count(), 1);

        let mut reader = JsonDriver::reader(store, registry()).unwrap();
        let decoded = reader.read_polymorphic::<dyn Base>("obj").unwrap().unwrap();
        assert_eq!(decoded.as_any().downcast_ref::<Foo>(), Some(&Foo { x: 9 }));
    }
}
