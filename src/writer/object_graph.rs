//! Append-only arena of indirect objects.
//!
//! Objects are addressed by [`ObjectId`] handles. Object numbers do not exist
//! until [`ObjectGraph::write_to`] numbers the list (position + 1) and writes
//! it, so forward references and cycles (page <-> pages tree) need no
//! backpatching. A slot can be reserved first and filled later.

use super::object_serializer::{ObjectSerializer, PdfFileWriter};
use crate::error::{Error, Result};
use crate::object::{Object, ObjectId};
use std::io::Write;

/// Ordered list of every indirect object in a document.
#[derive(Debug, Default)]
pub struct ObjectGraph {
    objects: Vec<Option<Object>>,
    root: Option<ObjectId>,
    info: Option<ObjectId>,
}

impl ObjectGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object and return its handle.
    pub fn add(&mut self, obj: impl Into<Object>) -> ObjectId {
        self.objects.push(Some(obj.into()));
        ObjectId(self.objects.len() - 1)
    }

    /// Reserve a slot to be filled with [`ObjectGraph::fill`].
    pub fn reserve(&mut self) -> ObjectId {
        self.objects.push(None);
        ObjectId(self.objects.len() - 1)
    }

    /// Fill a reserved slot.
    pub fn fill(&mut self, id: ObjectId, obj: impl Into<Object>) -> Result<()> {
        match self.objects.get_mut(id.0) {
            Some(slot @ None) => {
                *slot = Some(obj.into());
                Ok(())
            },
            Some(Some(_)) => Err(Error::InvalidStructure(format!(
                "object slot {} is already filled",
                id.0
            ))),
            None => Err(Error::InvalidStructure(format!("object slot {} does not exist", id.0))),
        }
    }

    /// Declare the document catalog. Only one root may be set.
    pub fn set_root(&mut self, id: ObjectId) -> Result<()> {
        if let Some(existing) = self.root {
            return Err(Error::InvalidStructure(format!(
                "catalog already set to slot {}, cannot set slot {}",
                existing.0, id.0
            )));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Declare the document information dictionary.
    pub fn set_info(&mut self, id: ObjectId) {
        self.info = Some(id);
    }

    /// Number of objects (reserved slots included).
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if no object has been added.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object in a slot, if filled.
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0).and_then(|o| o.as_ref())
    }

    /// Catalog handle.
    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    /// Check that the graph can be written: a root exists, every slot is
    /// filled and every handle points inside the list.
    pub fn validate(&self) -> Result<()> {
        let root = self
            .root
            .ok_or_else(|| Error::InvalidStructure("no catalog (root) object set".to_string()))?;
        if root.0 >= self.objects.len() {
            return Err(Error::InvalidStructure("root handle is out of range".to_string()));
        }
        for (index, slot) in self.objects.iter().enumerate() {
            let obj = slot.as_ref().ok_or_else(|| {
                Error::InvalidStructure(format!("object slot {} was reserved but never filled", index))
            })?;
            self.check_handles(obj, index)?;
        }
        Ok(())
    }

    fn check_handles(&self, obj: &Object, owner: usize) -> Result<()> {
        match obj {
            Object::Reference(id) if id.0 >= self.objects.len() => Err(Error::InvalidStructure(
                format!("object slot {} references missing slot {}", owner, id.0),
            )),
            Object::Array(items) => items.iter().try_for_each(|o| self.check_handles(o, owner)),
            Object::Dictionary(d) => d.values().try_for_each(|o| self.check_handles(o, owner)),
            Object::Stream(s) => s.dict.values().try_for_each(|o| self.check_handles(o, owner)),
            _ => Ok(()),
        }
    }

    /// Number every object and write the complete file.
    ///
    /// Validation runs before the first byte is written, so a structural
    /// error never leaves a partial file in the sink.
    pub fn write_to<W: Write>(&self, version: &str, w: W) -> Result<()> {
        self.validate()?;

        // Numbering: object number = position + 1, generation 0
        let numbers: Vec<u32> = (1..=self.objects.len() as u32).collect();
        let serializer = ObjectSerializer::new(&numbers);

        let mut file = PdfFileWriter::new(w);
        file.write_header(version)?;
        for (index, obj) in self.objects.iter().enumerate() {
            if let Some(obj) = obj {
                file.write_object(numbers[index], obj, &serializer)?;
            }
        }
        let root = self.root.map(|r| numbers[r.0]).unwrap_or(0);
        let info = self.info.map(|i| numbers[i.0]);
        file.write_xref_and_trailer(root, info)?;

        log::debug!("Wrote {} objects ({} bytes)", self.objects.len(), file.position());
        Ok(())
    }

    /// Write to an in-memory buffer.
    pub fn to_bytes(&self, version: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(version, &mut out)?;
        Ok(out)
    }
}
