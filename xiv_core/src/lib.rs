//! `xiv_core` is the core library for the xiv template compiler. It turns
//! `.xiv` template source into finished HTML by expanding reusable fragments,
//! structural directives, slots and placeholders.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template source
//!   → Lexer (tokenizes markup into start tags, end tags, text and comments)
//!   → Parser (builds the markup tree)
//!   → Directive processor, once per level:
//!       x-for → x-if → <x-temp> → {{ placeholders }}
//!   → Document renderer (unwraps <xiv type="main">, appends the runtime script)
//! ```
//!
//! ## Template Language
//!
//! ```html
//! <xiv type="main">
//!   <ul>
//!     <li x-for="item in items">{{ item.name | unnamed }}</li>
//!   </ul>
//!   <p x-if="not signed_in">Please sign in.</p>
//!   <x-temp x-name="card" t-title="Hello">Slot content</x-temp>
//! </xiv>
//! ```
//!
//! A fragment lives in `<template root>/<name>.xiv`, wraps its body in
//! `<xiv type="template">` and marks where slot content goes with
//! `<x-slot/>`. Each inclusion sees only the `t-*` arguments passed to it.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `xiv.toml`.
//!
//! ## Key Types
//!
//! - [`Compiler`]: Compiles documents against a template root.
//! - [`TemplateStore`]: Resolves fragment names to files below the root,
//!   rejecting anything that escapes it.
//! - [`ArgumentContext`]: The variables visible while expanding a fragment.
//! - [`Node`] and [`Element`]: The markup tree.
//! - [`XivError`]: Every failure a compilation can report.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xiv_core::{Compiler, read_runtime_script, render_document};
//!
//! let compiler = Compiler::new("templates").unwrap();
//! let nodes = compiler.compile_file("main.xiv").unwrap();
//! let html = render_document(nodes, read_runtime_script(None).as_deref());
//! std::fs::write("index.html", html).unwrap();
//! ```

pub use compiler::*;
pub use config::*;
pub use context::*;
pub use directive::*;
pub use document::*;
pub use engine::MAIN_LABEL;
pub use engine::sanitize_class_name;
pub use error::*;
pub use parser::*;
pub use placeholder::Placeholder;
pub use placeholder::substitute;
pub use store::*;
pub use tokens::Token;
pub use tree::*;

mod compiler;
pub mod config;
mod context;
mod directive;
mod document;
mod engine;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
mod parser;
mod placeholder;
mod store;
mod tokens;
mod tree;

#[cfg(test)]
mod __fixtures;
