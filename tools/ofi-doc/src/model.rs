//! Records extracted from object-factory declarations

use std::fmt;

/// Separator between a module qualifier and the rest of a type token.
pub const MODULE_SEPARATOR: &str = "::";

/// Class name used by the macro definitions themselves; never documented.
pub const RESERVED_CLASS: &str = "CLASS";

/// Module assigned to files outside any recognised module directory.
pub const UNKNOWN_MODULE: &str = "Unknown";

/// How an attribute is set from XML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Scalar value, set from an attribute or a `param` tag
    Param,
    /// Child object or container association
    Pointer,
    /// Unrecognised macro variant
    Unknown,
}

impl AttributeKind {
    /// Map the kind token of a `GM_OFI_<KIND>` macro, ignoring case and the
    /// second-generation `2` suffix.
    pub fn from_token(token: &str) -> Self {
        let token = token.to_ascii_lowercase();
        match token.strip_suffix('2').unwrap_or(token.as_str()) {
            "param" => AttributeKind::Param,
            "pointer" => AttributeKind::Pointer,
            _ => AttributeKind::Unknown,
        }
    }

    /// Single-character marker shown in the first table column
    pub fn marker(self) -> &'static str {
        match self {
            AttributeKind::Param => "P",
            AttributeKind::Pointer => "C",
            AttributeKind::Unknown => "?",
        }
    }
}

/// A type token split into its module qualifier and the remaining name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedType {
    pub module: Option<String>,
    pub name: String,
}

impl QualifiedType {
    /// Split at the first `::`, so `std::filesystem::path` becomes
    /// `std` + `filesystem::path`.
    pub fn parse(token: &str) -> Self {
        match token.split_once(MODULE_SEPARATOR) {
            Some((module, name)) => Self {
                module: Some(module.to_string()),
                name: name.to_string(),
            },
            None => Self {
                module: None,
                name: token.to_string(),
            },
        }
    }
}

/// One documented configurable attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    pub attribute_name: String,
    pub declaring_module: String,
    pub type_name: String,
    pub type_module: Option<String>,
    pub accessor_method: String,
    pub kind: AttributeKind,
}

impl AttributeRecord {
    pub fn new(
        kind: AttributeKind,
        declaring_module: &str,
        attribute_name: &str,
        type_token: &str,
        accessor_method: &str,
    ) -> Self {
        let ty = QualifiedType::parse(type_token);
        Self {
            attribute_name: attribute_name.to_string(),
            declaring_module: declaring_module.to_string(),
            type_name: ty.name,
            type_module: ty.module,
            accessor_method: accessor_method.to_string(),
            kind,
        }
    }
}

/// Identity of a documented class: owning module and class name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassKey {
    pub module: String,
    pub class_name: String,
}

impl ClassKey {
    pub fn new(module: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            class_name: class_name.into(),
        }
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.class_name)
    }
}

/// A class declared as a sub-class of another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDeclaration {
    pub class_name: String,
    pub base_name: String,
}

/// A single recognised declaration, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Attribute {
        class_name: String,
        record: AttributeRecord,
    },
    Base(BaseDeclaration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_token() {
        assert_eq!(AttributeKind::from_token("PARAM"), AttributeKind::Param);
        assert_eq!(AttributeKind::from_token("param2"), AttributeKind::Param);
        assert_eq!(AttributeKind::from_token("Pointer"), AttributeKind::Pointer);
        assert_eq!(AttributeKind::from_token("POINTER2"), AttributeKind::Pointer);
        assert_eq!(AttributeKind::from_token("VECTOR"), AttributeKind::Unknown);
    }

    #[test]
    fn test_kind_markers() {
        assert_eq!(AttributeKind::Param.marker(), "P");
        assert_eq!(AttributeKind::Pointer.marker(), "C");
        assert_eq!(AttributeKind::Unknown.marker(), "?");
    }

    #[test]
    fn test_qualified_type() {
        let ty = QualifiedType::parse("gmCore::Foo");
        assert_eq!(ty.module.as_deref(), Some("gmCore"));
        assert_eq!(ty.name, "Foo");

        let ty = QualifiedType::parse("bool");
        assert_eq!(ty.module, None);
        assert_eq!(ty.name, "bool");
    }

    #[test]
    fn test_qualified_type_splits_once() {
        let ty = QualifiedType::parse("std::filesystem::path");
        assert_eq!(ty.module.as_deref(), Some("std"));
        assert_eq!(ty.name, "filesystem::path");
    }

    #[test]
    fn test_record_new() {
        let record = AttributeRecord::new(
            AttributeKind::Pointer,
            "gmGraphics",
            "view",
            "gmGraphics::View",
            "addView",
        );
        assert_eq!(record.declaring_module, "gmGraphics");
        assert_eq!(record.type_module.as_deref(), Some("gmGraphics"));
        assert_eq!(record.type_name, "View");
        assert_eq!(record.accessor_method, "addView");
    }
}
