use crate::{
    names::{Name, NameTable},
    reader::SaveReader,
    Result, SaveFormat,
};

/// Decoding context threaded through every decoder.
///
/// Bundles the cursor with the facts that change how bytes are interpreted:
/// the save generation, the name strategy (inline strings vs. a table), and
/// whether property sizes are 64-bit (ASA world blobs). Recovered per-property
/// failures accumulate in `parse_errors` instead of aborting the decode.
pub struct Archive<'a> {
    pub reader: SaveReader<'a>,
    pub format: SaveFormat,
    names: Option<&'a NameTable>,
    wide_sizes: bool,
    pub parse_errors: Vec<String>,
}

impl<'a> Archive<'a> {
    pub fn new(data: &'a [u8], format: SaveFormat) -> Self {
        Self {
            reader: SaveReader::new(data),
            format,
            names: None,
            wide_sizes: false,
            parse_errors: Vec::new(),
        }
    }

    /// Switch name reads from inline strings to table references. The table
    /// is shared by reference so per-object archives stay allocation-free.
    pub fn with_name_table(mut self, table: &'a NameTable) -> Self {
        self.names = Some(table);
        self
    }

    /// Property sizes become u64 (ASA world-save object blobs).
    pub fn with_wide_sizes(mut self) -> Self {
        self.wide_sizes = true;
        self
    }

    pub fn is_asa(&self) -> bool {
        self.format.is_asa()
    }

    /// Read a name reference: an `(index, suffix)` pair through the table when
    /// one is active, otherwise an inline length-prefixed string.
    pub fn read_name(&mut self) -> Result<Name> {
        match self.names {
            Some(table) => {
                let index = self.reader.read_i32()?;
                let number = self.reader.read_i32()?;
                table.resolve(index, number)
            }
            None => Ok(Name::from(self.reader.read_fstring()?)),
        }
    }

    /// Read a property value size, 32- or 64-bit depending on the format.
    pub fn read_size(&mut self) -> Result<u64> {
        if self.wide_sizes {
            self.reader.read_u64()
        } else {
            Ok(u64::from(self.reader.read_u32()?))
        }
    }

    pub fn record_error(&mut self, message: String) {
        tracing::debug!(target: "arksave", "{message}");
        self.parse_errors.push(message);
    }
}
