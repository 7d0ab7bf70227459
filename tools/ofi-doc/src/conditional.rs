//! Line-by-line tracking of `#ifdef` / `#ifndef` / `#else` / `#endif`
//!
//! Only define checks are evaluated. Any other `#if` keeps the activity of
//! the enclosing block, so the tracker follows nesting without understanding
//! expressions.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::Defines;

static IFDEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*ifdef\s*([a-zA-Z0-9_]+)").expect("valid regex"));
static IFNDEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*ifndef\s*([a-zA-Z0-9_]+)").expect("valid regex"));
static ANY_IF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#\s*if").expect("valid regex"));
static ELSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#\s*else").expect("valid regex"));
static ENDIF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*endif").expect("valid regex"));

/// Preprocessor directive relevant to branch tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    IfDef(&'a str),
    IfNDef(&'a str),
    If,
    Else,
    EndIf,
}

impl<'a> Directive<'a> {
    /// Recognise a directive line. `#elif`, `#define` and friends are not
    /// tracked and yield `None`.
    pub fn parse(line: &'a str) -> Option<Self> {
        if let Some(caps) = IFDEF.captures(line) {
            return caps.get(1).map(|m| Directive::IfDef(m.as_str()));
        }
        if let Some(caps) = IFNDEF.captures(line) {
            return caps.get(1).map(|m| Directive::IfNDef(m.as_str()));
        }
        if ANY_IF.is_match(line) {
            return Some(Directive::If);
        }
        if ELSE.is_match(line) {
            return Some(Directive::Else);
        }
        if ENDIF.is_match(line) {
            return Some(Directive::EndIf);
        }
        None
    }
}

/// Stack of open conditional blocks for one file
///
/// Each entry is the activity of one open block. A block opened inside an
/// inactive block starts inactive; `#else` flips the innermost entry as is.
#[derive(Debug, Default)]
pub struct ConditionalTracker {
    stack: Vec<bool>,
    unbalanced: usize,
}

impl ConditionalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the current nesting level is scanned
    pub fn is_active(&self) -> bool {
        self.stack.last().copied().unwrap_or(true)
    }

    /// Number of open blocks
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// `#else` / `#endif` lines seen without a matching `#if`
    pub fn unbalanced(&self) -> usize {
        self.unbalanced
    }

    fn push(&mut self, condition: bool) {
        let active = condition && self.is_active();
        self.stack.push(active);
    }

    /// Apply a single line and report whether it is active.
    ///
    /// Directive lines are themselves subject to the state after they are
    /// applied, so an `#ifdef` that opens an inactive block is inactive.
    pub fn feed(&mut self, line: &str, defines: &Defines) -> bool {
        match Directive::parse(line) {
            Some(Directive::IfDef(symbol)) => self.push(defines.contains(symbol)),
            Some(Directive::IfNDef(symbol)) => self.push(!defines.contains(symbol)),
            Some(Directive::If) => self.push(true),
            Some(Directive::Else) => match self.stack.last_mut() {
                Some(active) => *active = !*active,
                None => {
                    self.unbalanced += 1;
                    tracing::debug!("#else without matching #if");
                }
            },
            Some(Directive::EndIf) => {
                if self.stack.pop().is_none() {
                    self.unbalanced += 1;
                    tracing::debug!("#endif without matching #if");
                }
            }
            None => {}
        }
        self.is_active()
    }
}
