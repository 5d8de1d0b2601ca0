//! Export of diagram-encoded vectors.
//!
//! A vector over `n` boolean variables has one entry per state, but is stored
//! as a decision diagram whose paths lead to the non-zero values. Exporting
//! walks the diagram together with an [offset index][crate::diagram::OffsetIndex]
//! that turns each path into a dense position:
//!
//! - the zero terminal ends the walk, so all-zero subtrees cost nothing;
//! - a node that does not test the variable expected at the current level is
//!   followed through both branches unchanged, which keeps the diagram and the
//!   index aligned across skipped levels;
//! - the low branch is always walked before the high branch, so positions come
//!   out strictly increasing without any sorting.
//!
//! # Example
//!
//! ```
//! use mtbdd_export::export::{ExportConfig, VectorExporter};
//! use mtbdd_export::format::ExportFormat;
//! use mtbdd_export::mtbdd::Mtbdd;
//! use mtbdd_export::odd::Odd;
//! use mtbdd_export::types::Var;
//!
//! let dd = Mtbdd::new();
//! let vars = Var::range(2);
//! let f = dd.from_entries(&vars, &[(0b10, 3.5)]);
//! let odd = Odd::full(vars.len());
//!
//! let exporter = VectorExporter::new(ExportConfig::default()).unwrap();
//! let mut out = Vec::new();
//! exporter.export_to_writer(&dd, f, &vars, &odd, odd.root(), &mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "4 1\n2 3.5\n");
//! ```

use std::fs::File;
use std::hash::Hash;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use log::{info, trace};
use num_bigint::BigUint;

use crate::diagram::{count_nonzero, DecisionDiagram, OffsetIndex};
use crate::format::ExportFormat;
use crate::types::Var;

/// Error type for export operations.
#[derive(Debug)]
pub enum ExportError {
    /// Unusable format, name or destination. Nothing has been written.
    Config(String),
    /// Writing the output failed part-way.
    Io(io::Error),
}

impl ExportError {
    /// Status code reported to callers that expect an integer result.
    pub fn status(&self) -> i32 {
        match self {
            ExportError::Config(_) => -1,
            ExportError::Io(_) => -2,
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ExportError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Config(_) => None,
            ExportError::Io(e) => Some(e),
        }
    }
}

/// `0` for a successful export, the error's [status][ExportError::status] otherwise.
pub fn status_code<T>(result: &Result<T, ExportError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.status(),
    }
}

/// Where exported text goes.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum Destination {
    #[default]
    Stdout,
    File(PathBuf),
}

/// Configuration of a [`VectorExporter`].
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// Variable name used by the MATLAB format (default: "v").
    pub name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Plain,
            name: "v".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Only the MATLAB format writes the name, so only it has to be an identifier.
    fn validate(&self) -> Result<(), ExportError> {
        if self.format != ExportFormat::Matlab {
            return Ok(());
        }
        let mut chars = self.name.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(ExportError::Config(format!("invalid vector name '{}'", self.name)))
        }
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExportSummary {
    /// Number of positions spanned by the index.
    pub positions: u64,
    /// Number of entries written.
    pub entries: u64,
    /// Non-zero count placed in the header, for formats that have one.
    pub estimated_nonzeros: Option<BigUint>,
}

/// Writes the non-zero entries of diagram-encoded vectors.
#[derive(Debug, Clone)]
pub struct VectorExporter {
    config: ExportConfig,
}

impl VectorExporter {
    /// Creates an exporter, rejecting configurations that cannot be rendered.
    pub fn new(config: ExportConfig) -> Result<Self, ExportError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Exports the vector `root` over `vars` to `destination`.
    ///
    /// A file destination is created before anything is written; failing to
    /// create it is a [`ExportError::Config`]. The output is buffered and the
    /// file is closed before returning, on success and on failure alike.
    pub fn export<D, I>(
        &self,
        dd: &D,
        root: D::Node,
        vars: &[Var],
        index: &I,
        index_root: I::Node,
        destination: &Destination,
    ) -> Result<ExportSummary, ExportError>
    where
        D: DecisionDiagram,
        D::Node: Eq + Hash,
        I: OffsetIndex,
    {
        match destination {
            Destination::Stdout => {
                let stdout = io::stdout();
                let mut out = BufWriter::new(stdout.lock());
                self.export_to_writer(dd, root, vars, index, index_root, &mut out)
            }
            Destination::File(path) => {
                let file = File::create(path)
                    .map_err(|e| ExportError::Config(format!("cannot create '{}': {}", path.display(), e)))?;
                let mut out = BufWriter::new(file);
                self.export_to_writer(dd, root, vars, index, index_root, &mut out)
            }
        }
    }

    /// Exports the vector `root` over `vars` to `out`: header, entries, flush.
    ///
    /// On a write error, whatever was buffered is flushed on a best-effort
    /// basis and the error is returned.
    pub fn export_to_writer<D, I, W>(
        &self,
        dd: &D,
        root: D::Node,
        vars: &[Var],
        index: &I,
        index_root: I::Node,
        out: &mut W,
    ) -> Result<ExportSummary, ExportError>
    where
        D: DecisionDiagram,
        D::Node: Eq + Hash,
        I: OffsetIndex,
        W: Write,
    {
        let result = self.write_vector(dd, root, vars, index, index_root, out);
        match result {
            Ok(summary) => {
                out.flush()?;
                info!(
                    "Exported {} of {} positions as {}",
                    summary.entries, summary.positions, self.config.format
                );
                Ok(summary)
            }
            Err(e) => {
                let _ = out.flush();
                Err(e.into())
            }
        }
    }

    fn write_vector<D, I, W>(
        &self,
        dd: &D,
        root: D::Node,
        vars: &[Var],
        index: &I,
        index_root: I::Node,
        out: &mut W,
    ) -> io::Result<ExportSummary>
    where
        D: DecisionDiagram,
        D::Node: Eq + Hash,
        I: OffsetIndex,
        W: Write,
    {
        let format = self.config.format;
        let name = self.config.name.as_str();
        let positions = index.num_positions(index_root);
        info!(
            "Exporting vector over {} variables ({} positions) as {}",
            vars.len(),
            positions,
            format
        );

        let estimated_nonzeros = format.needs_nonzero_count().then(|| count_nonzero(dd, root, vars));
        format.write_header(out, name, positions, estimated_nonzeros.as_ref())?;

        let mut entries = 0u64;
        for_each_entry(dd, root, vars, index, index_root, &mut |position, value| {
            trace!("entry {} = {}", position, value);
            entries += 1;
            format.write_entry(out, name, position, value)
        })?;

        Ok(ExportSummary {
            positions,
            entries,
            estimated_nonzeros,
        })
    }
}

/// Calls `sink` with `(position, value)` for every non-zero entry, in
/// increasing position order. The first error returned by `sink` stops the
/// walk and is passed through.
///
/// # Panics
///
/// Panics if a decision node is still present after the last variable, i.e.
/// the diagram tests variables missing from `vars`.
pub fn for_each_entry<D, I, E, F>(
    dd: &D,
    root: D::Node,
    vars: &[Var],
    index: &I,
    index_root: I::Node,
    sink: &mut F,
) -> Result<(), E>
where
    D: DecisionDiagram,
    I: OffsetIndex,
    F: FnMut(u64, f64) -> Result<(), E>,
{
    traverse(dd, root, vars, 0, index, index_root, 0, sink)
}

/// Collects all non-zero entries in increasing position order.
pub fn collect_entries<D, I>(dd: &D, root: D::Node, vars: &[Var], index: &I, index_root: I::Node) -> Vec<(u64, f64)>
where
    D: DecisionDiagram,
    I: OffsetIndex,
{
    let mut entries = Vec::new();
    let result: Result<(), std::convert::Infallible> =
        for_each_entry(dd, root, vars, index, index_root, &mut |position, value| {
            entries.push((position, value));
            Ok(())
        });
    match result {
        Ok(()) => entries,
        Err(never) => match never {},
    }
}

#[allow(clippy::too_many_arguments)]
fn traverse<D, I, E, F>(
    dd: &D,
    node: D::Node,
    vars: &[Var],
    level: usize,
    index: &I,
    index_node: I::Node,
    base: u64,
    sink: &mut F,
) -> Result<(), E>
where
    D: DecisionDiagram,
    I: OffsetIndex,
    F: FnMut(u64, f64) -> Result<(), E>,
{
    if dd.is_zero(node) {
        return Ok(());
    }

    if level == vars.len() {
        let value = dd.value(node).unwrap_or_else(|| {
            panic!(
                "Decision node below the last of {} variables: the diagram tests a variable outside the ordering",
                vars.len()
            )
        });
        return sink(base, value);
    }

    // A node on a later variable does not depend on the one at this level.
    let (low, high) = if dd.variable(node) > vars[level].id() {
        (node, node)
    } else {
        (dd.low(node), dd.high(node))
    };

    traverse(dd, low, vars, level + 1, index, index.low(index_node), base, sink)?;
    traverse(
        dd,
        high,
        vars,
        level + 1,
        index,
        index.high(index_node),
        base + index.high_offset(index_node),
        sink,
    )
}
