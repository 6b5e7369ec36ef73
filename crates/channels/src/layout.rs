//! Deterministic packing of quick reply labels into bounded rows.
//!
//! Labels are sanitized, then packed greedily left to right: a label joins
//! the current row while the row stays within `max_columns` and within
//! `max_row_len` characters (one separator character counted between
//! neighbours). Otherwise a new row is opened. Once `max_rows` rows exist,
//! every remaining label is dropped. A label longer than `max_row_len` is
//! never split; it gets a row of its own.

use serde::Serialize;

use crate::channel::{CONFIG_QR_MAX_COLUMNS, CONFIG_QR_MAX_ROW_LEN, CONFIG_QR_MAX_ROWS, Channel};

const SEPARATOR_LEN: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutLimits {
    /// Rows kept before remaining labels are dropped. Zero drops everything.
    pub max_rows: usize,
    /// Characters per row, separators included.
    pub max_row_len: usize,
    /// Labels per row. Zero is treated as one.
    pub max_columns: usize,
}

impl LayoutLimits {
    pub const fn new(max_rows: usize, max_row_len: usize, max_columns: usize) -> Self {
        Self {
            max_rows,
            max_row_len,
            max_columns,
        }
    }

    /// One label per row, no row budget: nothing is ever dropped.
    pub const fn unbounded() -> Self {
        Self::new(usize::MAX, usize::MAX, 1)
    }

    /// Start from `self` and apply any per-channel overrides.
    pub fn with_channel_overrides(self, channel: &Channel) -> Self {
        Self {
            max_rows: channel
                .usize_config(CONFIG_QR_MAX_ROWS)
                .unwrap_or(self.max_rows),
            max_row_len: channel
                .usize_config(CONFIG_QR_MAX_ROW_LEN)
                .unwrap_or(self.max_row_len),
            max_columns: channel
                .usize_config(CONFIG_QR_MAX_COLUMNS)
                .unwrap_or(self.max_columns),
        }
    }
}

/// Ordered rows of ordered button labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyboardLayout {
    rows: Vec<Vec<String>>,
}

impl KeyboardLayout {
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Labels in row-major order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }

    pub fn into_labels(self) -> Vec<String> {
        self.rows.into_iter().flatten().collect()
    }
}

/// Unescape `\/` to `/` and `\\` to `\`. Everything else is kept verbatim.
pub fn sanitize(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut chars = label.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && (next == '/' || next == '\\')
        {
            out.push(next);
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

/// Pack `labels` into rows under `limits`.
pub fn layout<S: AsRef<str>>(labels: &[S], limits: LayoutLimits) -> KeyboardLayout {
    let max_columns = limits.max_columns.max(1);
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row_len = 0usize;

    for raw in labels {
        let label = sanitize(raw.as_ref());
        let label_len = label.chars().count();

        let fits = rows.last().is_some_and(|row| {
            !row.is_empty()
                && row.len() < max_columns
                && row_len
                    .saturating_add(SEPARATOR_LEN)
                    .saturating_add(label_len)
                    <= limits.max_row_len
        });

        if fits {
            row_len += SEPARATOR_LEN + label_len;
            if let Some(row) = rows.last_mut() {
                row.push(label);
            }
            continue;
        }

        if rows.len() >= limits.max_rows {
            break;
        }
        row_len = label_len;
        rows.push(vec![label]);
    }

    KeyboardLayout { rows }
}
