//! Pipeline stages for exporting content to PDF.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ markup ──▶ prepare ──▶ render
//! (path/-)   (lexer)   (style+rules) (Renderer → PDF bytes)
//! ```
//!
//! 1. [`input`]   — read a file path or stdin into a [`prepare::ContentSource`]
//! 2. [`markup`]  — split markup from text; the detached [`markup::Element`]
//! 3. [`prepare`] — inject the print stylesheet and apply the text rules
//! 4. [`render`]  — the [`render::Renderer`] capability and its Chrome backend

pub mod input;
pub mod markup;
pub mod prepare;
pub mod render;
