//! Widget registry: per-key editable cell state and stable key ordering.
//!
//! Each key the store has ever pushed owns a [`WidgetEntry`]: the authoritative
//! editable [`CellGrid`] the rendered card is a projection of, the shape
//! fingerprint recorded at the last reconciliation, and the optional pre-toggle
//! snapshot. Entries are created on first push and never destroyed (keys are
//! append-only for the session lifetime).
//!
//! The registry maintains two parallel ordered views over the keys - the
//! detail list and the navigation index. Both are mutated together and hold
//! the identical, strictly lexicographically increasing sequence at all times.

use std::collections::HashMap;

use kvgrid_core::{ShapeFingerprint, Value};

/// Whether a grid renders as a single text field or a grid of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Scalar,
    Matrix,
}

/// The editable cell state of one card.
///
/// A scalar grid is stored as a single row holding a single cell so that all
/// cell operations work uniformly in row-major terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    kind: GridKind,
    rows: Vec<Vec<String>>,
}

impl CellGrid {
    /// Build a grid mirroring `value`'s structure.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Scalar(text) => Self {
                kind: GridKind::Scalar,
                rows: vec![vec![text.clone()]],
            },
            Value::Matrix(rows) => Self {
                kind: GridKind::Matrix,
                rows: rows.clone(),
            },
        }
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    pub fn is_scalar(&self) -> bool {
        self.kind == GridKind::Scalar
    }

    /// Rows of cell text, for rendering.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Total number of cells in row-major order.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Cell text at a row-major index.
    pub fn cell(&self, index: usize) -> Option<&str> {
        let (row, col) = self.locate(index)?;
        Some(&self.rows[row][col])
    }

    /// Mutable cell text at a row-major index.
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut String> {
        let (row, col) = self.locate(index)?;
        Some(&mut self.rows[row][col])
    }

    /// Convert a row-major index to `(row, col)` coordinates.
    pub fn locate(&self, index: usize) -> Option<(usize, usize)> {
        let mut remaining = index;
        for (row, cells) in self.rows.iter().enumerate() {
            if remaining < cells.len() {
                return Some((row, remaining));
            }
            remaining -= cells.len();
        }
        None
    }

    /// Overwrite cell contents from `value` index-by-index in row-major
    /// order, keeping the grid structure intact.
    ///
    /// Incoming cells past the grid's capacity are dropped: the caller has
    /// already decided the shapes match by fingerprint, and a mismatch here
    /// is the documented fingerprint-collision approximation.
    pub fn patch_in_place(&mut self, value: &Value) {
        match value {
            Value::Scalar(text) => {
                if let Some(cell) = self.cell_mut(0) {
                    *cell = text.clone();
                }
            }
            Value::Matrix(rows) => {
                let mut index = 0;
                for row in rows {
                    for text in row {
                        match self.cell_mut(index) {
                            Some(cell) => *cell = text.clone(),
                            None => return,
                        }
                        index += 1;
                    }
                }
            }
        }
    }

    /// Collect current cell contents into a [`Value`].
    ///
    /// Empty matrix cells are layout padding, not data: they are dropped, and
    /// rows left with no cells are dropped too. Scalar text is taken verbatim,
    /// empty or not.
    pub fn collect(&self) -> Value {
        match self.kind {
            GridKind::Scalar => Value::Scalar(self.rows[0][0].clone()),
            GridKind::Matrix => Value::Matrix(
                self.rows
                    .iter()
                    .map(|row| row.iter().filter(|c| !c.is_empty()).cloned().collect())
                    .filter(|row: &Vec<String>| !row.is_empty())
                    .collect(),
            ),
        }
    }
}

/// Everything the registry tracks for one key.
#[derive(Debug, Clone)]
pub struct WidgetEntry {
    pub key: String,
    /// Fingerprint recorded at the last reconciliation; compared against
    /// incoming values to decide patch vs. rebuild.
    pub last_shape: ShapeFingerprint,
    pub grid: CellGrid,
    /// Pre-toggle value while the key is in Toggled state; `None` in Normal.
    pub snapshot: Option<Value>,
}

impl WidgetEntry {
    pub fn new(key: impl Into<String>, value: &Value) -> Self {
        Self {
            key: key.into(),
            last_shape: value.fingerprint(),
            grid: CellGrid::from_value(value),
            snapshot: None,
        }
    }

    /// Whether the key is in Toggled state (displaying a zero-filled
    /// stand-in for the snapshotted real value).
    pub fn is_toggled(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Owned map from key to widget state plus the two ordered views.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    entries: HashMap<String, WidgetEntry>,
    detail_order: Vec<String>,
    nav_order: Vec<String>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.detail_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detail_order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&WidgetEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut WidgetEntry> {
        self.entries.get_mut(key)
    }

    /// Insert a new entry at its lexicographic position in both ordered
    /// views. The views mutate together; no partial-insert state is
    /// observable from outside.
    ///
    /// Duplicate keys overwrite the stored entry without reordering.
    pub fn insert_sorted(&mut self, entry: WidgetEntry) {
        let key = entry.key.clone();
        if self.entries.insert(key.clone(), entry).is_none() {
            // Linear scan to the first existing key that exceeds the new key.
            let pos = self
                .detail_order
                .iter()
                .position(|k| k.as_str() > key.as_str())
                .unwrap_or(self.detail_order.len());
            self.detail_order.insert(pos, key.clone());
            self.nav_order.insert(pos, key);
        }
    }

    /// Keys in current lexicographic order. A live view over registry state:
    /// restartable, reflects mutations made before the next iteration, must
    /// not be mutated concurrently with its own iteration (the registry is
    /// single-threaded by construction).
    pub fn ordered_keys(&self) -> impl Iterator<Item = &str> {
        self.detail_order.iter().map(String::as_str)
    }

    /// Positional index of `key` in the ordered views.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.detail_order.iter().position(|k| k == key)
    }

    /// Key at a positional index in the ordered views.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.detail_order.get(index).map(String::as_str)
    }

    /// Entry at a positional index in the ordered views.
    pub fn entry_at(&self, index: usize) -> Option<&WidgetEntry> {
        self.key_at(index).and_then(|k| self.entries.get(k))
    }

    /// The navigation index view. Identical to the detail view by invariant;
    /// exposed separately so the invariant is checkable.
    pub fn nav_keys(&self) -> &[String] {
        &self.nav_order
    }

    /// Ordered entries for the detail pane.
    pub fn iter(&self) -> impl Iterator<Item = &WidgetEntry> {
        self.detail_order
            .iter()
            .filter_map(|k| self.entries.get(k))
    }

    // ── Toggle snapshot state machine ────────────────────────────────────

    pub fn snapshot(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).and_then(|e| e.snapshot.as_ref())
    }

    pub fn set_snapshot(&mut self, key: &str, value: Value) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.snapshot = Some(value);
        }
    }

    pub fn clear_snapshot(&mut self, key: &str) -> Option<Value> {
        self.entries.get_mut(key).and_then(|e| e.snapshot.take())
    }
}
