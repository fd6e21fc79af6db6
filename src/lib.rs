//! mdxlsx - Pure-Rust Markdown to Excel converter with rich text cells
//!
//! This crate converts a Markdown document into a single-worksheet XLSX
//! file. Block structure (headings, paragraphs, lists, blockquotes, code
//! blocks) maps onto worksheet rows with nesting expressed as cell
//! indentation, and inline formatting (bold, italic, strikethrough, code,
//! links) is preserved as rich text runs inside each cell.
//!
//! Unsupported constructs (tables, images, HTML, footnotes) are skipped
//! predictably: they produce warnings in the result instead of corrupting
//! the output, and the surrounding content is still converted.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mdxlsx::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a converter with default settings
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     // Convert a Markdown file to an XLSX file (written atomically)
//!     let result = converter.convert_file("notes.md", "notes.xlsx")?;
//!
//!     // Report skipped constructs
//!     for warning in &result.warnings {
//!         eprintln!("skipped {} at block {}", warning.kind, warning.block_index);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! For in-memory conversion, use `convert_to_vec` or any `Write + Seek`
//! target:
//!
//! ```rust
//! use mdxlsx::ConverterBuilder;
//!
//! # fn main() -> Result<(), mdxlsx::MdToXlsxError> {
//! let converter = ConverterBuilder::new().build()?;
//! let (xlsx_bytes, result) = converter.convert_to_vec("# Title\n\n- a\n- b")?;
//!
//! assert_eq!(result.rows.len(), 3);
//! assert!(!xlsx_bytes.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use mdxlsx::{ConverterBuilder, LinkStyle};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_sheet_name("Notes")            // Worksheet name
//!         .with_link_style(LinkStyle::VisualOnly)  // Drop hyperlink targets
//!         .with_heading_scale(false)           // Uniform heading font size
//!         .build()?;
//!
//!     converter.convert_file("notes.md", "notes.xlsx")?;
//!     Ok(())
//! }
//! ```
//!
//! # Inspecting rows without serializing
//!
//! The conversion core can be used on its own; `convert` returns the row
//! and warning sequences without writing any file:
//!
//! ```rust
//! use mdxlsx::{ConverterBuilder, RowKind};
//!
//! # fn main() -> Result<(), mdxlsx::MdToXlsxError> {
//! let converter = ConverterBuilder::new().build()?;
//! let result = converter.convert("**bold *and italic* text**")?;
//!
//! let runs = result.rows[0].cell.runs();
//! assert_eq!(result.rows[0].kind, RowKind::Paragraph);
//! assert_eq!(runs.len(), 3);
//! assert!(runs[1].attrs.bold && runs[1].attrs.italic);
//! # Ok(())
//! # }
//! ```

mod api;
mod ast;
mod builder;
mod compose;
mod error;
mod layout;
mod limits;
mod output;
mod parser;
mod types;

// 公開API
pub use api::LinkStyle;
pub use builder::{Converter, ConverterBuilder};
pub use error::MdToXlsxError;
pub use types::{
    ConversionResult, RichTextCell, Row, RowKind, StyleAttributeSet, StyleRun, UnsupportedKind,
    Warning,
};
