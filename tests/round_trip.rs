use serde::{Deserialize, Serialize};
use vc_serial::codec::registry::TypeRegistryArc;
use vc_serial::codec::{Codec, CodecError, FormatDriver, JsonDriver};
use vc_serial::document::MemoryStore;

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

#[derive(Debug, Default, PartialEq)]
struct Node {
    name: String,
    weights: Vec<f32>,
    color: Rgb,
    next: Option<Box<Node>>,
}

impl<D: FormatDriver> Codec<D> for Node {
    fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
        driver.write_value("name", &self.name)?;
        driver.write_value("weights", &self.weights)?;
        driver.write_value("color", &self.color)?;
        driver.write_optional("next", self.next.as_deref())
    }

    fn decode(&mut self, driver: &mut D) -> Result<(), CodecError> {
        driver.read_into("name", &mut self.name)?;
        driver.read_into("weights", &mut self.weights)?;
        driver.read_into("color", &mut self.color)?;
        self.next = driver.read_optional::<Node>("next")?.map(Box::new);
        Ok(())
    }
}

fn chain() -> Node {
    Node {
        name: "head".to_owned(),
        weights: vec![0.5, 1.5],
        color: Rgb { r: 1, g: 2, b: 3 },
        next: Some(Box::new(Node {
            name: "tail".to_owned(),
            ..Node::default()
        })),
    }
}

#[test]
fn nested_objects() {
    let store = MemoryStore::new();
    let node = chain();

    {
        let mut writer = JsonDriver::writer(store.clone(), TypeRegistryArc::default());
        writer.write_object("root", &node).unwrap();
    }

    assert_eq!(
        store.text(),
        concat!(
            r#"{"root":{"name":"head","weights":[0.5,1.5],"color":{"r":1,"g":2,"b":3},"#,
            r#""next":{"name":"tail","weights":[],"color":{"r":0,"g":0,"b":0},"next":null}}}"#,
        )
    );

    let mut reader = JsonDriver::reader(store, TypeRegistryArc::default()).unwrap();
    let mut decoded = Node::default();
    reader.read_object("root", &mut decoded).unwrap();
    assert_eq!(decoded, node);
}

#[derive(Debug, Default, PartialEq)]
struct Header {
    version: u32,
    tags: Vec<String>,
}

impl<D: FormatDriver> Codec<D> for Header {
    fn encode(&self, driver: &mut D) -> Result<(), CodecError> {
        driver.write_value("version", &self.version)?;
        driver.write_value("tags", &self.tags)
    }

    fn decode(&mut self, driver: &mut D) -> Result<(), CodecError> {
        self.version = driver.read_required("version")?;
        driver.read_into("tags", &mut self.tags)
    }
}

#[test]
fn root_level_codec() {
    let header = Header {
        version: 3,
        tags: vec!["a".to_owned(), "b".to_owned()],
    };

    let mut writer = JsonDriver::in_memory(TypeRegistryArc::default());
    header.encode(&mut writer).unwrap();

    let text = writer.dump().unwrap();
    assert_eq!(text, r#"{"version":3,"tags":["a","b"]}"#);

    let mut reader = JsonDriver::from_text(&text, TypeRegistryArc::default()).unwrap();
    let mut decoded = Header::default();
    decoded.decode(&mut reader).unwrap();
    assert_eq!(decoded, header);

    let mut reader = JsonDriver::from_text(r#"{"tags":[]}"#, TypeRegistryArc::default()).unwrap();
    let err = Header::default().decode(&mut reader).unwrap_err();
    assert!(err.is_missing_field());
}

#[test]
fn extra_fields_are_ignored() {
    let text = r#"{"root":{"name":"solo","unknown":true}}"#;
    let mut reader = JsonDriver::from_text(text, TypeRegistryArc::default()).unwrap();

    let mut decoded = Node::default();
    reader.read_object("root", &mut decoded).unwrap();
    assert_eq!(decoded.name, "solo");
    assert!(decoded.next.is_none());
}
