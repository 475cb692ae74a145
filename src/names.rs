use serde::{Serialize, Serializer};

use crate::{reader::SaveReader, Error, Result};

/// An interned name plus a numeric suffix.
///
/// Names are materialized either inline (a plain string, suffix 0) or as an
/// `(index, suffix)` pair resolved through a [`NameTable`]. Two names are
/// equal when both the resolved string and the suffix match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    value: String,
    number: u32,
}

impl Name {
    pub fn new(value: impl Into<String>, number: u32) -> Self {
        Self {
            value: value.into(),
            number,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// The `"None"` sentinel that terminates property lists.
    pub fn is_none(&self) -> bool {
        self.number == 0 && self.value == "None"
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self { value, number: 0 }
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self {
            value: value.to_owned(),
            number: 0,
        }
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.number != 0 {
            write!(f, "{}_{}", self.value, self.number)
        } else {
            f.write_str(&self.value)
        }
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Deduplicated string pool used by world saves.
///
/// ASE writes the table at a header-declared offset; ASA embeds it as a blob
/// in the header table of the SQLite container. Both use 1-based indices in
/// the serialized name references.
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    names: Vec<String>,
}

impl NameTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Decode `count` length-prefixed strings at the reader's position.
    pub fn read(reader: &mut SaveReader, count: usize) -> Result<Self> {
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(reader.read_fstring()?);
        }
        Ok(Self { names })
    }

    /// Decode a trailing table: seek to `offset`, read a count and that many
    /// strings, then restore the reader to where it was.
    pub fn read_at(reader: &mut SaveReader, offset: usize) -> Result<Self> {
        let saved = reader.tell();
        reader.seek(offset)?;
        let count = reader.read_i32()?;
        if count < 0 {
            return Err(Error::Corrupt(format!("negative name table count {count}")));
        }
        let table = Self::read(reader, count as usize)?;
        reader.seek(saved)?;
        Ok(table)
    }

    /// Resolve a serialized `(index, suffix)` reference. Indices are 1-based;
    /// an index outside the table is fatal corruption.
    pub fn resolve(&self, index: i32, number: i32) -> Result<Name> {
        let internal = index as i64 - 1;
        if internal < 0 || internal as usize >= self.names.len() {
            return Err(Error::Corrupt(format!(
                "name table index {} out of range (table has {} entries)",
                index,
                self.names.len()
            )));
        }
        Ok(Name {
            value: self.names[internal as usize].clone(),
            number: number as u32,
        })
    }
}
