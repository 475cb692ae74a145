//! Builders for synthetic save images used by the integration tests.
#![allow(dead_code)]

/// Length-prefixed string with a trailing NUL.
pub fn fstring(s: &str) -> Vec<u8> {
    let mut out = ((s.len() + 1) as i32).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    out
}

pub fn none_terminator() -> Vec<u8> {
    fstring("None")
}

/// Generic inline-name property record.
pub fn prop(name: &str, type_name: &str, index: u32, prelude: &[u8], value: &[u8]) -> Vec<u8> {
    let mut out = fstring(name);
    out.extend(fstring(type_name));
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(&index.to_le_bytes());
    out.extend_from_slice(prelude);
    out.extend_from_slice(value);
    out
}

pub fn int_prop(name: &str, value: i32) -> Vec<u8> {
    prop(name, "IntProperty", 0, &[], &value.to_le_bytes())
}

pub fn uint64_prop(name: &str, value: u64) -> Vec<u8> {
    prop(name, "UInt64Property", 0, &[], &value.to_le_bytes())
}

pub fn uint16_prop(name: &str, value: u16) -> Vec<u8> {
    prop(name, "UInt16Property", 0, &[], &value.to_le_bytes())
}

pub fn float_prop(name: &str, value: f32) -> Vec<u8> {
    prop(name, "FloatProperty", 0, &[], &value.to_le_bytes())
}

pub fn str_prop(name: &str, value: &str) -> Vec<u8> {
    prop(name, "StrProperty", 0, &[], &fstring(value))
}

pub fn name_prop(name: &str, value: &str) -> Vec<u8> {
    prop(name, "NameProperty", 0, &[], &fstring(value))
}

pub fn bool_prop(name: &str, value: bool) -> Vec<u8> {
    prop(name, "BoolProperty", 0, &[u8::from(value)], &[])
}

/// Raw-byte ByteProperty (enum name `"None"`).
pub fn byte_prop(name: &str, index: u32, value: u8) -> Vec<u8> {
    prop(name, "ByteProperty", index, &fstring("None"), &[value])
}

pub fn int_array_prop(name: &str, values: &[i32]) -> Vec<u8> {
    let mut body = (values.len() as u32).to_le_bytes().to_vec();
    for v in values {
        body.extend_from_slice(&v.to_le_bytes());
    }
    prop(name, "ArrayProperty", 0, &fstring("IntProperty"), &body)
}

pub fn str_array_prop(name: &str, values: &[&str]) -> Vec<u8> {
    let mut body = (values.len() as u32).to_le_bytes().to_vec();
    for v in values {
        body.extend(fstring(v));
    }
    prop(name, "ArrayProperty", 0, &fstring("StrProperty"), &body)
}

pub fn byte_array_prop(name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = (bytes.len() as u32).to_le_bytes().to_vec();
    body.extend_from_slice(bytes);
    prop(name, "ArrayProperty", 0, &fstring("ByteProperty"), &body)
}

/// Property-list struct property.
pub fn struct_prop(name: &str, struct_type: &str, body: &[u8]) -> Vec<u8> {
    prop(name, "StructProperty", 0, &fstring(struct_type), body)
}

/// Struct array: count, an inner element header, then the elements.
pub fn struct_array_prop(name: &str, struct_type: &str, elements: &[Vec<u8>]) -> Vec<u8> {
    let element_bytes: usize = elements.iter().map(Vec::len).sum();
    let mut body = (elements.len() as u32).to_le_bytes().to_vec();
    body.extend(fstring(name));
    body.extend(fstring("StructProperty"));
    body.extend_from_slice(&(element_bytes as u32).to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend(fstring(struct_type));
    for element in elements {
        body.extend_from_slice(element);
    }
    prop(name, "ArrayProperty", 0, &fstring("StructProperty"), &body)
}

/// One object of an inline-header file (profile/tribe/cloud/cryopod payload).
pub struct ObjSpec {
    pub class: String,
    pub names: Vec<String>,
    pub is_item: bool,
    pub location: Option<[f32; 6]>,
    pub props: Vec<u8>,
}

impl ObjSpec {
    pub fn new(class: &str, names: &[&str], props: Vec<u8>) -> Self {
        Self {
            class: class.to_owned(),
            names: names.iter().map(|&n| n.to_owned()).collect(),
            is_item: false,
            location: None,
            props,
        }
    }

    pub fn item(mut self) -> Self {
        self.is_item = true;
        self
    }

    pub fn at(mut self, location: [f32; 6]) -> Self {
        self.location = Some(location);
        self
    }

    fn header(&self, props_offset: i32) -> Vec<u8> {
        let mut out = vec![0u8; 16]; // nil guid
        out.extend(fstring(&self.class));
        out.extend_from_slice(&u32::from(self.is_item).to_le_bytes());
        out.extend_from_slice(&(self.names.len() as i32).to_le_bytes());
        for name in &self.names {
            out.extend(fstring(name));
        }
        out.extend_from_slice(&0u32.to_le_bytes()); // from_data_file
        out.extend_from_slice(&0i32.to_le_bytes()); // data_file_index
        match self.location {
            Some(loc) => {
                out.extend_from_slice(&1u32.to_le_bytes());
                for v in loc {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
            None => out.extend_from_slice(&0u32.to_le_bytes()),
        }
        out.extend_from_slice(&props_offset.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes()); // should_be_loaded
        out
    }
}

/// Assemble an inline-header file: version, object count, headers with
/// absolute property offsets, then the property blocks.
pub fn inline_object_file(version: i32, objects: &[ObjSpec]) -> Vec<u8> {
    let header_len: usize = objects.iter().map(|o| o.header(0).len()).sum();
    let mut props_offset = 8 + header_len;

    let mut out = version.to_le_bytes().to_vec();
    out.extend_from_slice(&(objects.len() as i32).to_le_bytes());
    for object in objects {
        out.extend(object.header(props_offset as i32));
        props_offset += object.props.len();
    }
    for object in objects {
        out.extend_from_slice(&object.props);
    }
    out
}

/// An embedded cryopod payload is the same layout without a version field.
pub fn embedded_save(objects: &[ObjSpec]) -> Vec<u8> {
    let header_len: usize = objects.iter().map(|o| o.header(0).len()).sum();
    let mut props_offset = 4 + header_len;

    let mut out = (objects.len() as i32).to_le_bytes().to_vec();
    for object in objects {
        out.extend(object.header(props_offset as i32));
        props_offset += object.props.len();
    }
    for object in objects {
        out.extend_from_slice(&object.props);
    }
    out
}

/// 1-based name pool mirroring the on-disk name table.
pub struct NamePool {
    pub names: Vec<String>,
}

impl NamePool {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|&n| n.to_owned()).collect(),
        }
    }

    pub fn idx(&self, name: &str) -> i32 {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| i as i32 + 1)
            .unwrap_or_else(|| panic!("name {name:?} missing from pool"))
    }

    /// Serialized name reference: table index plus suffix number.
    pub fn nref(&self, name: &str, number: i32) -> Vec<u8> {
        let mut out = self.idx(name).to_le_bytes().to_vec();
        out.extend_from_slice(&number.to_le_bytes());
        out
    }

    /// The table blob: count plus strings.
    pub fn table_bytes(&self) -> Vec<u8> {
        let mut out = (self.names.len() as i32).to_le_bytes().to_vec();
        for name in &self.names {
            out.extend(fstring(name));
        }
        out
    }

    /// Table-referenced property record; `wide` switches to u64 sizes (ASA
    /// world blobs).
    pub fn tprop(
        &self,
        name: &str,
        type_name: &str,
        index: u32,
        prelude: &[u8],
        value: &[u8],
        wide: bool,
    ) -> Vec<u8> {
        let mut out = self.nref(name, 0);
        out.extend(self.nref(type_name, 0));
        if wide {
            out.extend_from_slice(&(value.len() as u64).to_le_bytes());
        } else {
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        }
        out.extend_from_slice(&index.to_le_bytes());
        out.extend_from_slice(prelude);
        out.extend_from_slice(value);
        out
    }

    pub fn t_int(&self, name: &str, value: i32, wide: bool) -> Vec<u8> {
        self.tprop(name, "IntProperty", 0, &[], &value.to_le_bytes(), wide)
    }

    pub fn t_uint16(&self, name: &str, value: u16, wide: bool) -> Vec<u8> {
        self.tprop(name, "UInt16Property", 0, &[], &value.to_le_bytes(), wide)
    }

    pub fn t_float(&self, name: &str, value: f32, wide: bool) -> Vec<u8> {
        self.tprop(name, "FloatProperty", 0, &[], &value.to_le_bytes(), wide)
    }

    pub fn t_str(&self, name: &str, value: &str, wide: bool) -> Vec<u8> {
        self.tprop(name, "StrProperty", 0, &[], &fstring(value), wide)
    }

    pub fn t_byte(&self, name: &str, index: u32, value: u8, wide: bool) -> Vec<u8> {
        self.tprop(name, "ByteProperty", index, &self.nref("None", 0), &[value], wide)
    }

    pub fn t_none(&self) -> Vec<u8> {
        self.nref("None", 0)
    }
}
