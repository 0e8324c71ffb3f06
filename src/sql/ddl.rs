//! Data Definition Language statements.
//!
//! Only index creation is needed: lookup columns are indexed once before
//! reports run.

use super::dialect::{Dialect, SqlDialect};
use super::token::{Token, TokenStream};

/// CREATE INDEX statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "CreateIndex has no effect until converted to SQL with to_sql()"]
pub struct CreateIndex {
    pub if_not_exists: bool,
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
}

impl CreateIndex {
    /// Create a new CREATE INDEX statement.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            if_not_exists: false,
            name: name.into(),
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Add IF NOT EXISTS clause. Dropped for dialects without it.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Add a column to the index.
    pub fn column(mut self, col: impl Into<String>) -> Self {
        self.columns.push(col.into());
        self
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Create).space().push(Token::Index);

        if self.if_not_exists && dialect.supports_if_not_exists() {
            ts.space()
                .push(Token::If)
                .space()
                .push(Token::Not)
                .space()
                .push(Token::Exists);
        }

        ts.space().push(Token::Ident(self.name.clone()));
        ts.space().push(Token::On).space();
        ts.push(Token::Ident(self.table.clone()));

        ts.space().lparen();
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.push(Token::Ident(col.clone()));
        }
        ts.rparen();

        ts
    }
}
