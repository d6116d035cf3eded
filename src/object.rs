//! PDF object types.
//!
//! Objects reference each other through [`ObjectId`] handles into the
//! [`ObjectGraph`](crate::writer::ObjectGraph) arena. A handle is only an
//! index; the object number written to the file is assigned when the graph is
//! serialized.

use crate::error::Result;
use indexmap::IndexMap;

/// Dictionary with insertion-ordered keys.
pub type Dict = IndexMap<String, Object>;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array)
    String(Vec<u8>),
    /// Name (written with a leading /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (key-value pairs)
    Dictionary(Dict),
    /// Stream (dictionary + data)
    Stream(Stream),
    /// Handle to another object in the same graph
    Reference(ObjectId),
}

/// In-memory handle to an object in the graph.
///
/// The wrapped value is the object's position in the append-only list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    /// Position of the object in the graph's list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stream object: dictionary plus (possibly compressed) body.
///
/// `/Length` is not stored; the serializer derives it from `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// Stream dictionary
    pub dict: Dict,
    /// Stream data as it will be written
    pub data: bytes::Bytes,
}

impl Stream {
    /// Create a stream whose body is written verbatim.
    pub fn new(dict: Dict, data: impl Into<bytes::Bytes>) -> Self {
        Self {
            dict,
            data: data.into(),
        }
    }

    /// Create a stream, compressing the body when `compress` is set.
    ///
    /// Compressed bodies get `/Filter [/FlateDecode]`.
    pub fn with_compression(mut dict: Dict, raw: &[u8], compress: bool) -> Result<Self> {
        if compress {
            dict.insert("Filter".to_string(), Object::Array(vec![Object::name("FlateDecode")]));
            Ok(Self::new(dict, crate::writer::compress::compress(raw)?))
        } else {
            Ok(Self::new(dict, raw.to_vec()))
        }
    }
}

impl Object {
    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream(_) => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Create a Name object.
    pub fn name(s: &str) -> Object {
        Object::Name(s.to_string())
    }

    /// Create a literal String object from text.
    pub fn string(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec())
    }

    /// Create an Array of reals.
    pub fn reals(values: &[f64]) -> Object {
        Object::Array(values.iter().map(|v| Object::Real(*v)).collect())
    }

    /// Create a Dictionary from key-value pairs, keeping their order.
    pub fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(dict(entries))
    }

    /// Try to cast to dictionary. Works for both Dictionary and Stream objects.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }
}

impl From<ObjectId> for Object {
    fn from(id: ObjectId) -> Self {
        Object::Reference(id)
    }
}

impl From<Dict> for Object {
    fn from(d: Dict) -> Self {
        Object::Dictionary(d)
    }
}

impl From<Stream> for Object {
    fn from(s: Stream) -> Self {
        Object::Stream(s)
    }
}

/// Build a [`Dict`] from key-value pairs, keeping their order.
pub fn dict(entries: Vec<(&str, Object)>) -> Dict {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Object::Null.type_name(), "Null");
        assert_eq!(Object::name("Page").type_name(), "Name");
        assert_eq!(Object::Reference(ObjectId(3)).type_name(), "Reference");
    }

    #[test]
    fn test_dict_preserves_insertion_order() {
        let d = dict(vec![
            ("Type", Object::name("Page")),
            ("MediaBox", Object::reals(&[0.0, 0.0, 10.0, 10.0])),
            ("Contents", Object::Reference(ObjectId(0))),
        ]);
        let keys: Vec<&str> = d.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Type", "MediaBox", "Contents"]);
    }

    #[test]
    fn test_uncompressed_stream_keeps_body() {
        let s = Stream::with_compression(Dict::new(), b"0 0 m", false).unwrap();
        assert_eq!(&s.data[..], b"0 0 m");
        assert!(!s.dict.contains_key("Filter"));
    }

    #[test]
    fn test_compressed_stream_sets_filter() {
        let s = Stream::with_compression(Dict::new(), b"0 0 m 10 10 l S", true).unwrap();
        let filter = s.dict.get("Filter").and_then(|f| f.as_array()).unwrap();
        assert_eq!(filter[0].as_name(), Some("FlateDecode"));
        assert_eq!(&s.data[..2], &[0x78, 0x9C]);
    }

    #[test]
    fn test_casts() {
        let obj = Object::dict(vec![("K", Object::Integer(1))]);
        assert!(obj.as_dict().is_some());
        assert!(obj.as_array().is_none());
        assert_eq!(Object::from(ObjectId(7)).as_reference(), Some(ObjectId(7)));
    }
}
