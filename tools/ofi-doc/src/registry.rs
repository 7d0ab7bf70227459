//! Accumulation of declarations across all scanned files

use std::collections::BTreeMap;

use crate::extractor::ScanBatch;
use crate::model::{AttributeRecord, ClassKey, Declaration, RESERVED_CLASS};

/// Every attribute and base declaration found in a run.
///
/// Records keep insertion order; sorting happens when a module is rendered.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    attributes: BTreeMap<ClassKey, Vec<AttributeRecord>>,
    bases: BTreeMap<ClassKey, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attribute(&mut self, key: ClassKey, record: AttributeRecord) {
        self.attributes.entry(key).or_default().push(record);
    }

    /// Record the base class of `key`, replacing any earlier declaration.
    pub fn set_base(&mut self, key: ClassKey, base: impl Into<String>) {
        let base = base.into();
        if let Some(previous) = self.bases.insert(key.clone(), base.clone()) {
            if previous != base {
                tracing::debug!("Base of {} redeclared: {} -> {}", key, previous, base);
            }
        }
    }

    /// Apply the declarations of one file in line order.
    pub fn merge(&mut self, batch: ScanBatch) {
        let module = batch.module;
        for declaration in batch.declarations {
            match declaration {
                Declaration::Attribute { class_name, record } => {
                    self.add_attribute(ClassKey::new(module.as_str(), class_name), record);
                }
                Declaration::Base(base) => {
                    self.set_base(ClassKey::new(module.as_str(), base.class_name), base.base_name);
                }
            }
        }
    }

    /// Modules with at least one attribute, ascending
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self
            .attributes
            .keys()
            .map(|key| key.module.as_str())
            .collect();
        modules.dedup();
        modules
    }

    /// Classes of a module with their records, ascending by class name.
    /// The reserved `CLASS` entry is skipped.
    pub fn classes<'a>(
        &'a self,
        module: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a [AttributeRecord])> + 'a {
        self.attributes
            .iter()
            .filter(move |(key, _)| key.module == module && key.class_name != RESERVED_CLASS)
            .map(|(key, records)| (key.class_name.as_str(), records.as_slice()))
    }

    pub fn attributes(&self, key: &ClassKey) -> &[AttributeRecord] {
        self.attributes.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn base_of(&self, key: &ClassKey) -> Option<&str> {
        self.bases.get(key).map(String::as_str)
    }

    /// Total number of attribute records, reserved entries included
    pub fn attribute_count(&self) -> usize {
        self.attributes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::scan_source;
    use crate::model::AttributeKind;

    fn record(name: &str) -> AttributeRecord {
        AttributeRecord::new(AttributeKind::Param, "gmCore", name, "int", "setX")
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        let mut registry = Registry::new();
        let key = ClassKey::new("gmCore", "A");
        registry.add_attribute(key.clone(), record("b"));
        registry.add_attribute(key.clone(), record("a"));
        registry.add_attribute(key.clone(), record("b"));

        let names: Vec<_> = registry
            .attributes(&key)
            .iter()
            .map(|r| r.attribute_name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "b"]);
        assert_eq!(registry.attribute_count(), 3);
    }

    #[test]
    fn test_base_last_write_wins() {
        let mut registry = Registry::new();
        registry.merge(scan_source("GM_OFI_DEFINE_SUB(A, First);", "gmCore", None));
        registry.merge(scan_source("GM_OFI_DEFINE_SUB(A, Second);", "gmCore", None));
        registry.merge(scan_source("GM_OFI_DEFINE_SUB(A, Other);", "gmGraphics", None));

        assert_eq!(registry.base_of(&ClassKey::new("gmCore", "A")), Some("Second"));
        assert_eq!(registry.base_of(&ClassKey::new("gmGraphics", "A")), Some("Other"));
        assert_eq!(registry.base_of(&ClassKey::new("gmCore", "B")), None);
    }

    #[test]
    fn test_modules_and_classes_sorted() {
        let mut registry = Registry::new();
        registry.merge(scan_source(
            "GM_OFI_PARAM(Zeta, z, int, setZ);\n\
             GM_OFI_PARAM(Alpha, a, int, setA);\n\
             GM_OFI_PARAM(CLASS, x, int, setX);",
            "gmGraphics",
            None,
        ));
        registry.merge(scan_source("GM_OFI_PARAM(Core, c, int, setC);", "gmCore", None));

        assert_eq!(registry.modules(), vec!["gmCore", "gmGraphics"]);
        let classes: Vec<_> = registry.classes("gmGraphics").map(|(name, _)| name).collect();
        assert_eq!(classes, vec!["Alpha", "Zeta"]);
        assert_eq!(registry.attribute_count(), 4);
    }

    #[test]
    fn test_base_only_module_not_listed() {
        let mut registry = Registry::new();
        registry.merge(scan_source("GM_OFI_DEFINE_SUB(A, B);", "gmCore", None));
        assert!(registry.modules().is_empty());
        assert!(registry.is_empty());
    }
}
