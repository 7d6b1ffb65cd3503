//! Just enough of the JVM class-file format to list declared methods.
//!
//! Walks the constant pool to resolve names, skips interfaces and fields,
//! then reads the method table. Attribute bodies are skipped by length.
use crate::error::StageError;
use std::path::Path;

const MAGIC: u32 = 0xCAFE_BABE;

/// Declared members of one compiled class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Binary name with `.` separators.
    pub class_name: String,
    /// Method names in declaration order, overloads collapsed. Constructors
    /// and static initializers are excluded.
    pub methods: Vec<String>,
}

impl ClassInfo {
    pub fn declares(&self, method: &str) -> bool {
        self.methods.iter().any(|name| name == method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassFormatError {
    #[error("bad magic 0x{0:08X}")]
    BadMagic(u32),

    #[error("truncated at byte {offset} while reading {what}")]
    Truncated { offset: usize, what: &'static str },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("constant pool index {0} does not name a UTF-8 entry")]
    NotUtf8(u16),

    #[error("constant pool index {0} does not name a class entry")]
    NotClass(u16),
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class { name_index: u16 },
    Other,
    /// Second slot of a long or double.
    Unusable,
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], ClassFormatError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFormatError::Truncated {
                offset: self.offset,
                what,
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self, what: &'static str) -> Result<u8, ClassFormatError> {
        Ok(self.take(1, what)?[0])
    }

    fn u16(&mut self, what: &'static str) -> Result<u16, ClassFormatError> {
        let raw = self.take(2, what)?;
        Ok(u16::from_be_bytes([raw[0], raw[1]]))
    }

    fn u32(&mut self, what: &'static str) -> Result<u32, ClassFormatError> {
        let raw = self.take(4, what)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn read(reader: &mut Reader<'_>) -> Result<Self, ClassFormatError> {
        let count = reader.u16("constant pool count")?;
        // Index 0 is never valid; keep a placeholder so indices line up.
        let mut entries = vec![Constant::Unusable];
        let mut index = 1u16;
        while index < count {
            let tag = reader.u8("constant tag")?;
            let entry = match tag {
                1 => {
                    let len = reader.u16("utf8 length")? as usize;
                    let raw = reader.take(len, "utf8 bytes")?;
                    Constant::Utf8(String::from_utf8_lossy(raw).into_owned())
                }
                7 => Constant::Class {
                    name_index: reader.u16("class name index")?,
                },
                8 | 16 | 19 | 20 => {
                    reader.take(2, "constant")?;
                    Constant::Other
                }
                15 => {
                    reader.take(3, "method handle")?;
                    Constant::Other
                }
                3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.take(4, "constant")?;
                    Constant::Other
                }
                5 | 6 => {
                    reader.take(8, "wide constant")?;
                    Constant::Other
                }
                tag => return Err(ClassFormatError::UnknownTag { tag, index }),
            };
            let wide = matches!(tag, 5 | 6);
            entries.push(entry);
            index += 1;
            if wide {
                entries.push(Constant::Unusable);
                index += 1;
            }
        }
        Ok(Self { entries })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassFormatError> {
        match self.entries.get(index as usize) {
            Some(Constant::Utf8(value)) => Ok(value),
            _ => Err(ClassFormatError::NotUtf8(index)),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, ClassFormatError> {
        match self.entries.get(index as usize) {
            Some(Constant::Class { name_index }) => self.utf8(*name_index),
            _ => Err(ClassFormatError::NotClass(index)),
        }
    }
}

fn skip_attributes(reader: &mut Reader<'_>) -> Result<(), ClassFormatError> {
    let count = reader.u16("attribute count")?;
    for _ in 0..count {
        reader.u16("attribute name")?;
        let len = reader.u32("attribute length")? as usize;
        reader.take(len, "attribute body")?;
    }
    Ok(())
}

/// Parse class-file bytes into the declared method catalogue.
pub fn parse_class(bytes: &[u8]) -> Result<ClassInfo, ClassFormatError> {
    let mut reader = Reader::new(bytes);
    let magic = reader.u32("magic")?;
    if magic != MAGIC {
        return Err(ClassFormatError::BadMagic(magic));
    }
    reader.u16("minor version")?;
    reader.u16("major version")?;
    let pool = ConstantPool::read(&mut reader)?;

    reader.u16("access flags")?;
    let this_class = reader.u16("this class")?;
    reader.u16("super class")?;
    let interfaces = reader.u16("interface count")?;
    for _ in 0..interfaces {
        reader.u16("interface index")?;
    }

    let fields = reader.u16("field count")?;
    for _ in 0..fields {
        reader.take(6, "field header")?;
        skip_attributes(&mut reader)?;
    }

    let method_count = reader.u16("method count")?;
    let mut methods: Vec<String> = Vec::new();
    for _ in 0..method_count {
        reader.u16("method access flags")?;
        let name_index = reader.u16("method name")?;
        reader.u16("method descriptor")?;
        skip_attributes(&mut reader)?;

        let name = pool.utf8(name_index)?;
        if name.starts_with('<') || methods.iter().any(|seen| seen == name) {
            continue;
        }
        methods.push(name.to_string());
    }

    Ok(ClassInfo {
        class_name: pool.class_name(this_class)?.replace('/', "."),
        methods,
    })
}

/// Read and parse the class file at `path`.
pub fn read_class_file(path: &Path) -> Result<ClassInfo, StageError> {
    if !path.is_file() {
        return Err(StageError::Precondition {
            what: "compiled class file",
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path).map_err(|err| StageError::io("read", path, err))?;
    parse_class(&bytes).map_err(|err| StageError::ClassFormat {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
#[path = "classfile_tests.rs"]
mod tests;
