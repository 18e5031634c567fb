//! Store value model: shape classification, fingerprinting, and wire forms.
//!
//! A value pushed by the store bridge is either a bare string or a matrix of
//! cells. The [`ShapeFingerprint`] is a cheap summary of a value's dimensions
//! used by the reconciler to decide between patching a rendered card in place
//! and rebuilding it. It is deliberately not a full structural diff: only the
//! row count and the first row's column count participate, so a ragged-row
//! change in a non-first row can go undetected until the next shape change.

use crate::error::{Error, Result};

/// A value held under a single key in the store.
///
/// Matrix rows may have different lengths (ragged grids are permitted).
/// Empty cells are empty strings; they are layout padding, not data, and are
/// dropped when a value is re-collected from an edited card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A plain text value, rendered as a single editable field.
    Scalar(String),
    /// A grid of cells, row-major.
    Matrix(Vec<Vec<String>>),
}

/// Dimension summary used for the patch-vs-rebuild decision.
///
/// `""` for scalars, otherwise `"<rows>,<cols of first row>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ShapeFingerprint(String);

impl ShapeFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShapeFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Value {
    /// Classify a raw wire value into a [`Value`].
    ///
    /// A JSON string becomes [`Value::Scalar`]. An array of arrays of strings
    /// or numbers becomes [`Value::Matrix`], with numbers formatted in their
    /// shortest decimal form. Anything else is a contract violation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedValue`] when the raw value is neither shape.
    pub fn classify(raw: &serde_json::Value) -> Result<Self> {
        match raw {
            serde_json::Value::String(s) => Ok(Value::Scalar(s.clone())),
            serde_json::Value::Array(rows) => {
                let mut matrix = Vec::with_capacity(rows.len());
                for (i, row) in rows.iter().enumerate() {
                    let cells = row.as_array().ok_or_else(|| {
                        Error::malformed_value(format!("row {i} is not an array"))
                    })?;
                    let mut out = Vec::with_capacity(cells.len());
                    for (j, cell) in cells.iter().enumerate() {
                        out.push(cell_text(cell).ok_or_else(|| {
                            Error::malformed_value(format!(
                                "cell ({i},{j}) is neither string nor number"
                            ))
                        })?);
                    }
                    matrix.push(out);
                }
                Ok(Value::Matrix(matrix))
            }
            other => Err(Error::malformed_value(format!(
                "expected string or array of arrays, got {other}"
            ))),
        }
    }

    /// Compute the shape fingerprint described in the module docs.
    pub fn fingerprint(&self) -> ShapeFingerprint {
        match self {
            Value::Scalar(_) => ShapeFingerprint(String::new()),
            Value::Matrix(rows) => {
                let cols = rows.first().map_or(0, Vec::len);
                ShapeFingerprint(format!("{},{}", rows.len(), cols))
            }
        }
    }

    /// Serialize to the outbound wire form.
    ///
    /// Scalars serialize to a bare string, matrices to nested arrays of
    /// strings. Numeric normalization is the command handlers' job; this
    /// method serializes cell text verbatim.
    pub fn serialize(&self) -> serde_json::Value {
        match self {
            Value::Scalar(text) => serde_json::Value::String(text.clone()),
            Value::Matrix(rows) => serde_json::Value::Array(
                rows.iter()
                    .map(|row| {
                        serde_json::Value::Array(
                            row.iter()
                                .map(|cell| serde_json::Value::String(cell.clone()))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }

    /// Render to the human-readable flattened form: matrix rows joined by
    /// `"; "`, cells within a row by a single space. This is also the store's
    /// native string encoding for matrices.
    pub fn flatten(&self) -> String {
        match self {
            Value::Scalar(text) => text.clone(),
            Value::Matrix(rows) => rows
                .iter()
                .map(|row| row.join(" "))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    /// Total number of cells, flattening rows in order (scalars count as one).
    pub fn cell_count(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Matrix(rows) => rows.iter().map(Vec::len).sum(),
        }
    }

    /// Cell text at a row-major index.
    pub fn cell_at(&self, index: usize) -> Option<&str> {
        match self {
            Value::Scalar(text) => (index == 0).then_some(text.as_str()),
            Value::Matrix(rows) => {
                let mut remaining = index;
                for row in rows {
                    if remaining < row.len() {
                        return Some(&row[remaining]);
                    }
                    remaining -= row.len();
                }
                None
            }
        }
    }

    /// Replace every cell with `fill`, preserving the shape.
    pub fn filled_with(&self, fill: &str) -> Value {
        match self {
            Value::Scalar(_) => Value::Scalar(fill.to_string()),
            Value::Matrix(rows) => Value::Matrix(
                rows.iter()
                    .map(|row| vec![fill.to_string(); row.len()])
                    .collect(),
            ),
        }
    }

    /// Apply [`normalize_cell`] to every cell.
    pub fn normalized(&self) -> Value {
        match self {
            Value::Scalar(text) => Value::Scalar(normalize_cell(text)),
            Value::Matrix(rows) => Value::Matrix(
                rows.iter()
                    .map(|row| row.iter().map(|c| normalize_cell(c)).collect())
                    .collect(),
            ),
        }
    }
}

/// Canonicalize numeric-looking cell text.
///
/// If the text parses as a finite-or-infinite (non-NaN) float and contains no
/// whitespace, it is replaced by the parsed number's shortest decimal string
/// (`"3.0"` becomes `"3"`, `"0.50"` becomes `"0.5"`). Otherwise the text is
/// kept verbatim.
pub fn normalize_cell(text: &str) -> String {
    match parse_numeric(text) {
        Some(num) => format_number(num),
        None => text.to_string(),
    }
}

/// Parse cell text as a number under the normalization rules: NaN and
/// whitespace-containing text are rejected.
pub fn parse_numeric(text: &str) -> Option<f64> {
    if text.contains(char::is_whitespace) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Shortest decimal rendering of a float (`0.0` -> `"0"`, `1.5` -> `"1.5"`).
pub fn format_number(num: f64) -> String {
    format!("{num}")
}

fn cell_text(cell: &serde_json::Value) -> Option<String> {
    match cell {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => i.to_string(),
            None => format_number(n.as_f64()?),
        }),
        _ => None,
    }
}
