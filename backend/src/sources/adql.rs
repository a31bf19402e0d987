//! Typed ADQL query construction for the Exoplanet Archive TAP service.
//!
//! Column and table names are compile-time constants. Caller-supplied values
//! only enter the query as [`Literal`]s: text is single-quoted with embedded
//! quotes doubled, numbers are rendered from finite `f64`s.

use std::fmt;

/// A value compared against a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Number(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(text) => write!(f, "'{}'", text.replace('\'', "''")),
            Literal::Number(n) if n.is_finite() => write!(f, "{}", n),
            Literal::Number(_) => f.write_str("NULL"),
        }
    }
}

/// A single `WHERE` condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    NotNull(&'static str),
    Eq(&'static str, Literal),
    AtLeast(&'static str, Literal),
    AtMost(&'static str, Literal),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::NotNull(column) => write!(f, "{} IS NOT NULL", column),
            Predicate::Eq(column, value) => write!(f, "{} = {}", column, value),
            Predicate::AtLeast(column, value) => write!(f, "{} >= {}", column, value),
            Predicate::AtMost(column, value) => write!(f, "{} <= {}", column, value),
        }
    }
}

/// `SELECT [TOP n] columns FROM table [WHERE p1 AND p2 ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: &'static str,
    columns: Vec<&'static str>,
    top: Option<u32>,
    predicates: Vec<Predicate>,
}

impl SelectQuery {
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            columns: Vec::new(),
            top: None,
            predicates: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: &[&'static str]) -> Self {
        self.columns.extend_from_slice(columns);
        self
    }

    pub fn top(mut self, rows: u32) -> Self {
        self.top = Some(rows);
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn filter_opt(self, predicate: Option<Predicate>) -> Self {
        match predicate {
            Some(p) => self.filter(p),
            None => self,
        }
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if let Some(top) = self.top {
            write!(f, "TOP {} ", top)?;
        }
        if self.columns.is_empty() {
            f.write_str("*")?;
        } else {
            f.write_str(&self.columns.join(", "))?;
        }
        write!(f, " FROM {}", self.table)?;
        for (i, predicate) in self.predicates.iter().enumerate() {
            let joiner = if i == 0 { " WHERE " } else { " AND " };
            write!(f, "{}{}", joiner, predicate)?;
        }
        Ok(())
    }
}
