//! Page generators

pub mod doxygen;

pub use doxygen::{DoxygenRenderer, RenderError, RenderedPage};
