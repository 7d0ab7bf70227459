//! Doxygen page generator
//!
//! Each module becomes one `\page` comment block holding a table per class.
//! The text comes from handlebars templates; the built-in ones live in
//! `tools/ofi-doc/templates/` and any of them can be replaced by a file with
//! the same name in a user supplied directory.

use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

use crate::config::GeneratorConfig;
use crate::locator::ModuleMatcher;
use crate::model::{AttributeKind, AttributeRecord, ClassKey, MODULE_SEPARATOR};
use crate::registry::Registry;

const PREAMBLE: &str = "preamble";
const CLASS: &str = "class";
const PARAM_ROW: &str = "param_row";
const POINTER_ROW: &str = "pointer_row";
const UNKNOWN_ROW: &str = "unknown_row";
const CLASS_END: &str = "class_end";
const PAGE_END: &str = "page_end";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (PREAMBLE, include_str!("../../templates/preamble.hbs")),
    (CLASS, include_str!("../../templates/class.hbs")),
    (PARAM_ROW, include_str!("../../templates/param_row.hbs")),
    (POINTER_ROW, include_str!("../../templates/pointer_row.hbs")),
    (UNKNOWN_ROW, include_str!("../../templates/unknown_row.hbs")),
    (CLASS_END, include_str!("../../templates/class_end.hbs")),
    (PAGE_END, include_str!("../../templates/page_end.hbs")),
];

/// Error building or filling page templates
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid template '{name}': {source}")]
    Template {
        name: String,
        source: Box<handlebars::TemplateError>,
    },

    #[error("Failed to render '{template}' for module {module}: {source}")]
    Render {
        template: &'static str,
        module: String,
        source: Box<handlebars::RenderError>,
    },
}

/// Documentation for one module, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub module: String,
    pub contents: String,
    pub attribute_count: usize,
}

#[derive(Serialize)]
struct PageContext<'a> {
    module: &'a str,
    namespace: &'a str,
    core_module: &'a str,
}

#[derive(Serialize)]
struct ClassContext<'a> {
    module: &'a str,
    namespace: &'a str,
    class: &'a str,
    base: Option<&'a str>,
}

#[derive(Serialize)]
struct RowContext<'a> {
    module: &'a str,
    namespace: &'a str,
    class: &'a str,
    marker: &'static str,
    attribute: &'a str,
    type_name: &'a str,
    full_type: String,
    method: &'a str,
}

/// Renders registry contents into Doxygen pages
pub struct DoxygenRenderer<'reg> {
    handlebars: Handlebars<'reg>,
    namespace: String,
    core_module: String,
    modules: ModuleMatcher,
}

impl<'reg> DoxygenRenderer<'reg> {
    /// Compile the built-in templates, replaced by `<name>.hbs` files from
    /// `config.templates` where present.
    pub fn new(config: &GeneratorConfig, modules: ModuleMatcher) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        for (name, builtin) in BUILTIN_TEMPLATES {
            let registered = match override_path(config.templates.as_deref(), name) {
                Some(path) => {
                    tracing::debug!("Using template {} from {}", name, path.display());
                    handlebars.register_template_file(name, &path)
                }
                None => handlebars.register_template_string(name, builtin),
            };
            registered.map_err(|e| RenderError::Template {
                name: name.to_string(),
                source: Box::new(e),
            })?;
        }

        Ok(Self {
            handlebars,
            namespace: config.namespace.clone(),
            core_module: format!("{}Core", config.module_prefix),
            modules,
        })
    }

    fn render_into<T: Serialize>(
        &self,
        output: &mut String,
        template: &'static str,
        module: &str,
        data: &T,
    ) -> Result<(), RenderError> {
        let text = self
            .handlebars
            .render(template, data)
            .map_err(|e| RenderError::Render {
                template,
                module: module.to_string(),
                source: Box::new(e),
            })?;
        output.push_str(&text);
        Ok(())
    }

    /// Fully qualified type used in link targets.
    ///
    /// A pointer type without a module qualifier lives in the declaring
    /// module; module-qualified types get the enclosing namespace.
    pub fn full_type(&self, record: &AttributeRecord) -> String {
        match (&record.type_module, record.kind) {
            (None, AttributeKind::Pointer) => format!(
                "{}::{}::{}",
                self.namespace, record.declaring_module, record.type_name
            ),
            (None, _) => record.type_name.clone(),
            (Some(type_module), _) if self.modules.is_module_name(type_module) => {
                format!("{}::{}::{}", self.namespace, type_module, record.type_name)
            }
            (Some(type_module), _) => format!("{}::{}", type_module, record.type_name),
        }
    }

    /// Render the page for one module.
    pub fn render_module(
        &self,
        registry: &Registry,
        module: &str,
    ) -> Result<RenderedPage, RenderError> {
        let namespace = self.namespace.as_str();
        let mut contents = String::new();
        let mut attribute_count = 0;

        let page = PageContext {
            module,
            namespace,
            core_module: &self.core_module,
        };
        self.render_into(&mut contents, PREAMBLE, module, &page)?;

        for (class, records) in registry.classes(module) {
            let key = ClassKey::new(module, class);
            let header = ClassContext {
                module,
                namespace,
                class,
                base: registry.base_of(&key),
            };
            self.render_into(&mut contents, CLASS, module, &header)?;

            let mut sorted: Vec<&AttributeRecord> = records.iter().collect();
            sorted.sort_by(|a, b| a.attribute_name.cmp(&b.attribute_name));

            for record in sorted {
                let template = match record.kind {
                    AttributeKind::Param => PARAM_ROW,
                    AttributeKind::Pointer => POINTER_ROW,
                    AttributeKind::Unknown => UNKNOWN_ROW,
                };
                let row = RowContext {
                    module,
                    namespace,
                    class,
                    marker: record.kind.marker(),
                    attribute: &record.attribute_name,
                    type_name: &record.type_name,
                    full_type: self.full_type(record),
                    method: method_name(class, &record.accessor_method),
                };
                self.render_into(&mut contents, template, module, &row)?;
                attribute_count += 1;
            }

            self.render_into(&mut contents, CLASS_END, module, &header)?;
        }

        self.render_into(&mut contents, PAGE_END, module, &page)?;

        Ok(RenderedPage {
            module: module.to_string(),
            contents,
            attribute_count,
        })
    }
}

fn override_path(dir: Option<&Path>, name: &str) -> Option<std::path::PathBuf> {
    let path = dir?.join(format!("{}.hbs", name));
    path.is_file().then_some(path)
}

/// Accessor name without a leading `Class::` qualifier
fn method_name<'a>(class: &str, accessor: &'a str) -> &'a str {
    accessor
        .strip_prefix(class)
        .and_then(|rest| rest.strip_prefix(MODULE_SEPARATOR))
        .unwrap_or(accessor)
}
