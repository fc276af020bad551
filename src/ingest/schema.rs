//! Typed row schemas.
//!
//! Each dataset shape declares its columns once: header name, position in
//! the standard export, and the ontology property the cell feeds. A
//! [`ColumnLayout`] is resolved once per dataset (by header name when the
//! header names every mapped column, positionally otherwise) and then turns
//! raw rows into [`TypedRow`]s whose cells are already coerced to the
//! property types.

use std::marker::PhantomData;

use crate::error::RecordError;
use crate::ontology::Property;
use crate::value::Value;

/// A column of a fixed dataset shape.
///
/// `ALL` lists the columns in their standard order, so that
/// `ALL[c.ordinal()] == c` and the ordinal doubles as the default position.
pub trait Column: Copy + Eq + std::fmt::Debug + 'static {
    const ALL: &'static [Self];

    /// Header name in the open-data API export.
    fn name(self) -> &'static str;

    /// Property this column feeds, `None` for columns the graph ignores.
    fn property(self) -> Option<Property>;

    /// Position in [`Column::ALL`].
    fn ordinal(self) -> usize;
}

/// Where each column of `C` sits in a concrete dataset.
#[derive(Debug, Clone)]
pub struct ColumnLayout<C: Column> {
    /// Cell index per column, indexed by ordinal.
    positions: Vec<usize>,
    required_width: usize,
    by_name: bool,
    _columns: PhantomData<C>,
}

impl<C: Column> ColumnLayout<C> {
    /// The standard column order.
    pub fn positional() -> Self {
        Self::with_positions(C::ALL.iter().map(|c| c.ordinal()).collect(), false)
    }

    /// Locate columns by header name, falling back to the standard order when
    /// the header does not name every mapped column.
    pub fn from_header(header: &[String]) -> Self {
        let normalized: Vec<String> = header.iter().map(|h| normalize(h)).collect();
        let mut positions = Vec::with_capacity(C::ALL.len());
        for column in C::ALL {
            let wanted = normalize(column.name());
            match normalized.iter().position(|h| *h == wanted) {
                Some(index) => positions.push(index),
                None if column.property().is_none() => positions.push(column.ordinal()),
                None => {
                    tracing::debug!(
                        missing = column.name(),
                        "header does not name every column, using standard order"
                    );
                    return Self::positional();
                }
            }
        }
        Self::with_positions(positions, true)
    }

    fn with_positions(positions: Vec<usize>, by_name: bool) -> Self {
        let required_width = C::ALL
            .iter()
            .filter(|c| c.property().is_some())
            .map(|c| positions[c.ordinal()] + 1)
            .max()
            .unwrap_or(0);
        Self {
            positions,
            required_width,
            by_name,
            _columns: PhantomData,
        }
    }

    /// Whether columns were located through the header row.
    pub fn by_name(&self) -> bool {
        self.by_name
    }

    /// Minimum number of cells a row must have.
    pub fn required_width(&self) -> usize {
        self.required_width
    }

    /// Cell index of `column`.
    pub fn position(&self, column: C) -> usize {
        self.positions[column.ordinal()]
    }

    /// Coerce every mapped cell of `row` (1-based `row_number`, header excluded).
    pub fn extract(&self, row_number: usize, row: &[String]) -> Result<TypedRow<C>, RecordError> {
        if row.len() < self.required_width {
            return Err(RecordError::MissingColumns {
                row: row_number,
                required: self.required_width,
                found: row.len(),
            });
        }
        let mut values = Vec::with_capacity(C::ALL.len());
        for column in C::ALL {
            let Some(property) = column.property() else {
                values.push(Value::Empty);
                continue;
            };
            let cell = &row[self.position(*column)];
            let expected = property.value_type();
            let value = Value::coerce(cell, expected).ok_or_else(|| RecordError::InvalidCell {
                row: row_number,
                column: column.name(),
                property,
                expected,
                cell: cell.clone(),
            })?;
            values.push(value);
        }
        Ok(TypedRow {
            values,
            _columns: PhantomData,
        })
    }
}

/// A row whose cells have been coerced to their properties' types.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow<C: Column> {
    values: Vec<Value>,
    _columns: PhantomData<C>,
}

impl<C: Column> TypedRow<C> {
    /// Coerced value of `column` (`Empty` for unmapped columns).
    pub fn get(&self, column: C) -> &Value {
        &self.values[column.ordinal()]
    }

    /// `(property, value)` pairs for the mapped columns among `columns`.
    pub fn pairs(&self, columns: &[C]) -> Vec<(Property, Value)> {
        columns
            .iter()
            .filter_map(|c| c.property().map(|p| (p, self.get(*c).clone())))
            .collect()
    }
}

/// Header comparison ignores case and anything that is not alphanumeric,
/// so `Date Rptd`, `DATE_RPTD` and `date_rptd` all match.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
