//! Data model for analysis input and output.
//!
//! Input types ([`Document`], [`Page`], [`Table`], [`VisualElement`]) mirror
//! what the upstream PDF extraction layer supplies. Output types
//! ([`EncodedSpan`], [`ChunkAnalysis`], [`DocumentReport`]) are produced once
//! and never mutated afterwards.

mod analysis;
mod document;
mod page;
mod report;
mod span;
mod table;
mod visual;

pub use analysis::ChunkAnalysis;
pub use document::{Document, Metadata};
pub use page::Page;
pub use report::{DocumentReport, PageSummary, ReportStats};
pub use span::{EncodedSpan, EncodingKind};
pub(crate) use span::truncate_sample;
pub use table::{Table, TableCell, TableRow};
pub use visual::{BoundingBox, VisualElement, VisualKind};
