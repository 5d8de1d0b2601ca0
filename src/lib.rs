//! # mtbdd-export: sparse export of diagram-encoded vectors
//!
//! Probabilistic model checkers store vectors over huge state spaces as
//! **multi-terminal binary decision diagrams (MTBDDs)**: one entry per
//! assignment of the boolean state variables, with the diagram sharing all
//! common structure. This crate writes the non-zero entries of such a vector
//! to plain text, numbering states densely through an **offset-labelled
//! decision diagram (ODD)**.
//!
//! ## How it works
//!
//! The exporter walks the MTBDD and the ODD in lock-step:
//!
//! - The zero terminal stops the walk, so zero regions of the vector cost
//!   nothing, no matter how many positions they cover.
//! - A node that skips variables (because the function does not depend on
//!   them) is followed through both branches at every skipped level, keeping
//!   the MTBDD and the ODD aligned.
//! - Low branches are visited before high branches, so entries come out in
//!   strictly increasing position order.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mtbdd_export::export::{ExportConfig, VectorExporter};
//! use mtbdd_export::format::ExportFormat;
//! use mtbdd_export::mtbdd::Mtbdd;
//! use mtbdd_export::odd::Odd;
//! use mtbdd_export::types::Var;
//!
//! let dd = Mtbdd::new();
//! let vars = Var::range(3);
//!
//! // 2.0 whenever x1 and x3 hold, regardless of x2.
//! let f = dd.mk_cube([1, 3], 2.0);
//! let odd = Odd::full(vars.len());
//!
//! let config = ExportConfig::new(ExportFormat::Matlab).with_name("p");
//! let exporter = VectorExporter::new(config).unwrap();
//! let mut out = Vec::new();
//! exporter.export_to_writer(&dd, f, &vars, &odd, odd.root(), &mut out).unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "p = sparse(8,1);\np(6)=2;\np(8)=2;\n"
//! );
//! ```
//!
//! ## Core Components
//!
//! - **[`export`]**: the traversal and the [`VectorExporter`][crate::export::VectorExporter].
//! - **[`format`]**: output layouts and value formatting.
//! - **[`diagram`]**: the read-only traits the traversal is written against.
//! - **[`mtbdd`]** and **[`odd`]**: in-memory implementations of those traits.

pub mod diagram;
pub mod export;
pub mod format;
pub mod mtbdd;
pub mod node;
pub mod odd;
pub mod reference;
pub mod types;
