//! Statement structures handed to the executors.
//!
//! These are what a SQL front end would produce. Expressions inside them are
//! unbound [FactorTree]s; they are checked and converted when the statement
//! runs.

use crate::constraint::OnAction;
use crate::expr::FactorTree;
use crate::schema::ColumnDef;

/// `field REFERENCES master_table(master_field)` inside a CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub field: String,
    pub master_table: String,
    pub master_field: String,
    pub on_delete: OnAction,
    pub on_update: OnAction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTableQuery {
    pub table_name: String,
    pub columns: Vec<ColumnDef>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl CreateTableQuery {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn foreign_key(
        mut self,
        field: impl Into<String>,
        master_table: impl Into<String>,
        master_field: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKey {
            field: field.into(),
            master_table: master_table.into(),
            master_field: master_field.into(),
            on_delete: OnAction::NoAction,
            on_update: OnAction::NoAction,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTableQuery {
    pub table_name: String,
}

impl DropTableQuery {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
        }
    }
}

/// Multi-row INSERT. Each value is a constant expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertQuery {
    pub table_name: String,
    /// Target fields; `None` means every field in schema order.
    pub fields: Option<Vec<String>>,
    pub rows: Vec<Vec<FactorTree>>,
}

impl InsertQuery {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn row(mut self, values: Vec<FactorTree>) -> Self {
        self.rows.push(values);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateQuery {
    pub table_name: String,
    pub assignments: Vec<(String, FactorTree)>,
    pub predicate: Option<FactorTree>,
}

impl UpdateQuery {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: FactorTree) -> Self {
        self.assignments.push((field.into(), value));
        self
    }

    pub fn filter(mut self, predicate: FactorTree) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteQuery {
    pub table_name: String,
    pub predicate: Option<FactorTree>,
}

impl DeleteQuery {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            predicate: None,
        }
    }

    pub fn filter(mut self, predicate: FactorTree) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

/// One item of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// `*`: every field of every source and joined table.
    All,
    Field(String),
    /// `expr AS name`.
    Expr { expr: FactorTree, name: String },
}

/// One item of the FROM list.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table { name: String, alias: Option<String> },
    Subquery(Box<SelectQuery>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub alias: Option<String>,
    pub predicate: FactorTree,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub selectors: Vec<Selector>,
    pub sources: Vec<Source>,
    pub joins: Vec<Join>,
    pub predicate: Option<FactorTree>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(mut self) -> Self {
        self.selectors.push(Selector::All);
        self
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.selectors.push(Selector::Field(name.into()));
        self
    }

    pub fn expr(mut self, expr: FactorTree, name: impl Into<String>) -> Self {
        self.selectors.push(Selector::Expr {
            expr,
            name: name.into(),
        });
        self
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.sources.push(Source::Table {
            name: table.into(),
            alias: None,
        });
        self
    }

    pub fn from_as(mut self, table: impl Into<String>, alias: impl Into<String>) -> Self {
        self.sources.push(Source::Table {
            name: table.into(),
            alias: Some(alias.into()),
        });
        self
    }

    pub fn from_subquery(mut self, query: SelectQuery) -> Self {
        self.sources.push(Source::Subquery(Box::new(query)));
        self
    }

    pub fn join(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        alias: Option<&str>,
        predicate: FactorTree,
    ) -> Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            alias: alias.map(str::to_owned),
            predicate,
        });
        self
    }

    pub fn filter(mut self, predicate: FactorTree) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

/// Every statement that changes the database.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTableQuery),
    DropTable(DropTableQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
}
