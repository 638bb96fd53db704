//! Structured clause types accumulated by the query builder.

use crate::value::Value;

/// Boolean connector between adjacent where/having clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    /// The SQL keyword for this connector.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// One where clause, tagged by kind.
///
/// The grammar compiles these recursively; the builder flattens their
/// values in the same order to produce the binding list.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// `column <op> ?`
    Basic {
        column: String,
        operator: String,
        value: Value,
        boolean: BoolOp,
    },
    /// `column IN (?, ...)`
    In {
        column: String,
        values: Vec<Value>,
        boolean: BoolOp,
    },
    /// `column NOT IN (?, ...)`
    NotIn {
        column: String,
        values: Vec<Value>,
        boolean: BoolOp,
    },
    /// `column IS NULL`
    Null { column: String, boolean: BoolOp },
    /// `column IS NOT NULL`
    NotNull { column: String, boolean: BoolOp },
    /// `column BETWEEN ? AND ?`
    Between {
        column: String,
        low: Value,
        high: Value,
        boolean: BoolOp,
    },
    /// Raw SQL fragment with its own bindings.
    ///
    /// The caller is responsible for the fragment's safety.
    Raw {
        sql: String,
        bindings: Vec<Value>,
        boolean: BoolOp,
    },
    /// Parenthesized sub-group of clauses.
    Nested {
        clauses: Vec<WhereClause>,
        boolean: BoolOp,
    },
}

impl WhereClause {
    /// The connector joining this clause to the previous one.
    pub fn boolean(&self) -> BoolOp {
        match self {
            Self::Basic { boolean, .. }
            | Self::In { boolean, .. }
            | Self::NotIn { boolean, .. }
            | Self::Null { boolean, .. }
            | Self::NotNull { boolean, .. }
            | Self::Between { boolean, .. }
            | Self::Raw { boolean, .. }
            | Self::Nested { boolean, .. } => *boolean,
        }
    }

    /// Append this clause's leaf values in placeholder order.
    pub fn collect_bindings(&self, out: &mut Vec<Value>) {
        match self {
            Self::Basic { value, .. } => out.push(value.clone()),
            Self::In { values, .. } | Self::NotIn { values, .. } => {
                out.extend(values.iter().cloned());
            }
            Self::Null { .. } | Self::NotNull { .. } => {}
            Self::Between { low, high, .. } => {
                out.push(low.clone());
                out.push(high.clone());
            }
            Self::Raw { bindings, .. } => out.extend(bindings.iter().cloned()),
            Self::Nested { clauses, .. } => {
                for clause in clauses {
                    clause.collect_bindings(out);
                }
            }
        }
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    /// The SQL keyword for this join type.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "inner join",
            Self::Left => "left join",
            Self::Right => "right join",
            Self::Cross => "cross join",
        }
    }
}

/// One join clause: `<kind> <table> on <first> <op> <second>`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: String,
    pub first: String,
    pub operator: String,
    pub second: String,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// The SQL keyword for this direction.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One order-by entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    pub column: String,
    pub direction: Direction,
}

/// One having entry: `column <op> ?`.
#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub column: String,
    pub operator: String,
    pub value: Value,
    pub boolean: BoolOp,
}
