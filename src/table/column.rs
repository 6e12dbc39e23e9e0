use crate::table::value::Value;

/// Data type of a column, derived from the values it currently holds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColumnType {
    /// Boolean values (true/false)
    Boolean,
    /// 64-bit signed integers
    BigInt,
    /// Double-precision floating point numbers (integers may be mixed in)
    Double,
    /// Strings, or values of more than one kind
    Varchar,
}

impl ColumnType {
    /// Returns the lowercase name used in reports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::BigInt => "bigint",
            ColumnType::Double => "double",
            ColumnType::Varchar => "varchar",
        }
    }

    /// Candidate type of a single cell, `None` for missing cells.
    pub(crate) fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Missing => None,
            Value::Boolean(_) => Some(ColumnType::Boolean),
            Value::Integer(_) => Some(ColumnType::BigInt),
            Value::Double(_) => Some(ColumnType::Double),
            Value::Text(_) => Some(ColumnType::Varchar),
        }
    }

    /// Detects the most specific common type from a collection of candidate types.
    /// A column without any value counts as `Double`; inconsistent types fall back to `Varchar`.
    pub(crate) fn detect<I>(types: I) -> ColumnType
    where
        I: IntoIterator<Item = Option<ColumnType>>,
    {
        let types: Vec<ColumnType> = types.into_iter().flatten().collect();
        if types.is_empty() {
            ColumnType::Double
        } else if types.iter().all(|kind| kind.is_boolean()) {
            ColumnType::Boolean
        } else if types.iter().all(|kind| kind.is_int()) {
            ColumnType::BigInt
        } else if types.iter().all(|kind| kind.is_numeric()) {
            ColumnType::Double
        } else {
            ColumnType::Varchar
        }
    }

    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, ColumnType::Boolean)
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, ColumnType::BigInt)
    }

    /// Returns true if this column type represents numeric values (integer or floating point).
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::BigInt | ColumnType::Double)
    }
}

/// A named sequence of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current type of the column.
    pub fn kind(&self) -> ColumnType {
        ColumnType::detect(self.values.iter().map(ColumnType::of))
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_missing()).count()
    }

    /// Non-missing numeric values in row order; empty for non-numeric columns.
    pub(crate) fn numbers(&self) -> Vec<f64> {
        if !self.kind().is_numeric() {
            return Vec::new();
        }
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Promotes integers to doubles when a numeric column holds both.
    pub(crate) fn normalize(&mut self) {
        if self.kind() == ColumnType::Double {
            for value in self.values.iter_mut() {
                if let Value::Integer(integer) = value {
                    *value = Value::Double(*integer as f64);
                }
            }
        }
    }
}
