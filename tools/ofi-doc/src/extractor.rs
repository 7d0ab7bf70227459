//! Extraction of object-factory declarations from C++ source lines
//!
//! Recognised forms, each required to start at the first column:
//!
//! ```text
//! GM_OFI_PARAM(Class, name, Type, Class::setName);
//! GM_OFI_POINTER2(Class, child, gmCore::Object, addChild);
//! GM_OFI_DEFINE_SUB(Class, Base);
//! GM_OFI_DEFINE_ABSTRACT_SUB(Class, Base);
//! ```
//!
//! Any other `GM_OFI_<KIND>` macro with the four-argument shape is recorded
//! with an unknown kind. Invocations spanning several lines are not
//! recognised.

use regex::Regex;
use std::sync::LazyLock;

use crate::conditional::ConditionalTracker;
use crate::config::Defines;
use crate::model::{AttributeKind, AttributeRecord, BaseDeclaration, Declaration};

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^GM_OFI_([a-zA-Z]+2?)\(\s*([a-zA-Z0-9]+)[^a-zA-Z0-9]*([a-zA-Z0-9]+)[^a-zA-Z0-9]*([a-zA-Z0-9:]+)[^a-zA-Z0-9]*([a-zA-Z0-9:]+)\)",
    )
    .expect("valid regex")
});

/// Factory registration macros, which share the prefix but declare no
/// attribute
const REGISTRATION_MACROS: [&str; 2] = ["define", "declare"];

static BASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^GM_OFI_DEFINE(?:_ABSTRACT)?_SUB\(\s*([a-zA-Z0-9]+)[^a-zA-Z0-9]*([a-zA-Z0-9:]+)\)")
        .expect("valid regex")
});

/// Match a single line against the declaration patterns.
///
/// `module` is the module owning the file and becomes the declaring module of
/// any attribute record.
pub fn extract_line(line: &str, module: &str) -> Option<Declaration> {
    if let Some(caps) = ATTRIBUTE
        .captures(line)
        .filter(|caps| !is_registration(&caps[1]))
    {
        let kind = AttributeKind::from_token(&caps[1]);
        let record = AttributeRecord::new(kind, module, &caps[3], &caps[4], &caps[5]);
        return Some(Declaration::Attribute {
            class_name: caps[2].to_string(),
            record,
        });
    }

    BASE.captures(line).map(|caps| {
        Declaration::Base(BaseDeclaration {
            class_name: caps[1].to_string(),
            base_name: caps[2].to_string(),
        })
    })
}

fn is_registration(token: &str) -> bool {
    REGISTRATION_MACROS
        .iter()
        .any(|name| token.eq_ignore_ascii_case(name))
}

/// Declarations found in one source file, in line order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanBatch {
    pub module: String,
    pub declarations: Vec<Declaration>,
    /// `#else` / `#endif` lines without a matching `#if`
    pub unbalanced: usize,
    /// Conditional blocks still open at the end of the file
    pub unclosed: usize,
}

impl ScanBatch {
    pub fn attribute_count(&self) -> usize {
        self.declarations
            .iter()
            .filter(|d| matches!(d, Declaration::Attribute { .. }))
            .count()
    }
}

/// Scan the text of one file.
///
/// With `defines` set, lines inside inactive conditional branches are
/// skipped; without it every line is considered.
pub fn scan_source(source: &str, module: &str, defines: Option<&Defines>) -> ScanBatch {
    let mut tracker = ConditionalTracker::new();
    let mut declarations = Vec::new();

    for line in source.lines() {
        if defines.is_some_and(|defines| !tracker.feed(line, defines)) {
            continue;
        }
        if let Some(declaration) = extract_line(line, module) {
            declarations.push(declaration);
        }
    }

    ScanBatch {
        module: module.to_string(),
        declarations,
        unbalanced: tracker.unbalanced(),
        unclosed: tracker.depth(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(line: &str) -> (String, AttributeRecord) {
        match extract_line(line, "gmCore") {
            Some(Declaration::Attribute { class_name, record }) => (class_name, record),
            other => panic!("expected attribute, got {:?}", other),
        }
    }

    #[test]
    fn test_param() {
        let (class_name, record) = attribute("GM_OFI_PARAM(MyClass, enabled, bool, setEnabled)");
        assert_eq!(class_name, "MyClass");
        assert_eq!(record.kind, AttributeKind::Param);
        assert_eq!(record.attribute_name, "enabled");
        assert_eq!(record.declaring_module, "gmCore");
        assert_eq!(record.type_name, "bool");
        assert_eq!(record.type_module, None);
        assert_eq!(record.accessor_method, "setEnabled");
    }

    #[test]
    fn test_param2_with_qualified_type_and_method() {
        let (class_name, record) = attribute(
            "GM_OFI_PARAM2(VelocityViewpoint, velocity, Eigen::Vector3f, VelocityViewpoint::setVelocity);",
        );
        assert_eq!(class_name, "VelocityViewpoint");
        assert_eq!(record.kind, AttributeKind::Param);
        assert_eq!(record.type_module.as_deref(), Some("Eigen"));
        assert_eq!(record.type_name, "Vector3f");
        assert_eq!(record.accessor_method, "VelocityViewpoint::setVelocity");
    }

    #[test]
    fn test_pointer_case_insensitive() {
        let (_, record) = attribute("GM_OFI_Pointer2(SaveView, view, gmGraphics::View, addView);");
        assert_eq!(record.kind, AttributeKind::Pointer);
        assert_eq!(record.type_module.as_deref(), Some("gmGraphics"));
        assert_eq!(record.type_name, "View");
    }

    #[test]
    fn test_unrecognised_kind() {
        let (class_name, record) = attribute("GM_OFI_VECTOR2(Polygon, points, Point, addPoint);");
        assert_eq!(class_name, "Polygon");
        assert_eq!(record.kind, AttributeKind::Unknown);
        assert_eq!(record.attribute_name, "points");
        assert_eq!(record.type_name, "Point");
        assert_eq!(record.accessor_method, "addPoint");
    }

    #[test]
    fn test_base() {
        assert_eq!(
            extract_line("GM_OFI_DEFINE_SUB(SaveView, View);", "gmGraphics"),
            Some(Declaration::Base(BaseDeclaration {
                class_name: "SaveView".to_string(),
                base_name: "View".to_string(),
            }))
        );
        assert_eq!(
            extract_line("GM_OFI_DEFINE_ABSTRACT_SUB(MultiscopicView, View);", "gmGraphics"),
            Some(Declaration::Base(BaseDeclaration {
                class_name: "MultiscopicView".to_string(),
                base_name: "View".to_string(),
            }))
        );
    }

    #[test]
    fn test_non_matching_lines() {
        assert_eq!(extract_line("GM_OFI_DEFINE(TextureRenderer);", "gmCore"), None);
        assert_eq!(extract_line("GM_OFI_DEFINE_ABSTRACT(View);", "gmGraphics"), None);
        assert_eq!(extract_line("  GM_OFI_DECLARE;", "gmCore"), None);
        assert_eq!(
            extract_line(
                "   GM_OFI_PARAM(MyClass, file, std::string, MyClass::setFile);",
                "gmCore"
            ),
            None
        );
        assert_eq!(
            extract_line("#define GM_OFI_PARAM(CLASS, NAME, TYPE, FUNC) \\", "gmCore"),
            None
        );
        assert_eq!(
            extract_line("GM_OFI_PARAM(Foo, values, std::vector<float>, setValues);", "gmCore"),
            None
        );
    }

    #[test]
    fn test_scan_source_without_defines() {
        let source = "\
#include <gmCore/OFactory.hh>
#ifdef GM_USE_OSG
GM_OFI_DEFINE_SUB(OsgRenderer, Renderer);
GM_OFI_POINTER2(OsgRenderer, node, Node, addNode);
#endif
";
        let batch = scan_source(source, "gmGraphics", None);
        assert_eq!(batch.module, "gmGraphics");
        assert_eq!(batch.declarations.len(), 2);
        assert_eq!(batch.attribute_count(), 1);
    }

    #[test]
    fn test_scan_source_with_defines() {
        let source = "\
GM_OFI_PARAM(A, always, int, setAlways);
#ifdef FOO
GM_OFI_PARAM(A, foo, int, setFoo);
#else
GM_OFI_PARAM(A, notFoo, int, setNotFoo);
#endif
";
        let names = |batch: ScanBatch| -> Vec<String> {
            batch
                .declarations
                .into_iter()
                .filter_map(|d| match d {
                    Declaration::Attribute { record, .. } => Some(record.attribute_name),
                    Declaration::Base(_) => None,
                })
                .collect()
        };

        let without = scan_source(source, "gmCore", Some(&Defines::default()));
        assert_eq!(names(without), vec!["always", "notFoo"]);

        let with = scan_source(source, "gmCore", Some(&Defines::parse("FOO")));
        assert_eq!(names(with), vec!["always", "foo"]);
    }

    #[test]
    fn test_scan_source_reports_imbalance() {
        let source = "#endif\n#ifdef FOO\nGM_OFI_PARAM(A, a, int, setA);\n";
        let batch = scan_source(source, "gmCore", Some(&Defines::default()));
        assert_eq!(batch.unbalanced, 1);
        assert_eq!(batch.unclosed, 1);
        assert!(batch.declarations.is_empty());
    }
}
