use tracing::{debug, debug_span};

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::expr::{Expr, ExprTreeConverter, Factor, FactorTree, NoScanSelector};
use crate::query::{JoinKind, SelectQuery, Selector, Source};
use crate::scan::{
    ExtendScan, LeftJoinScan, ProductScan, ProjectScan, QualifiedName, Scan, SelectScan,
};
use crate::value::Value;

use super::checks::convert_against;

/// The rows of a SELECT: an open scan plus the ordered list of reported
/// field names.
#[derive(Debug)]
pub struct QueryResult {
    pub fields: Vec<String>,
    pub scan: Scan,
}

impl QueryResult {
    /// Advances to the next row and reads the reported fields in order.
    pub fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        if !self.scan.next()? {
            return Ok(None);
        }
        self.fields
            .iter()
            .map(|field| self.scan.get_field(field))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    pub fn collect_rows(mut self) -> Result<Vec<Vec<Value>>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Renders every remaining row, see [render_result].
    pub fn render(mut self) -> Result<String> {
        render_result(&mut self.scan, &self.fields)
    }
}

/// Pipe-delimited text: a header line with the field names, then one line
/// per row. NULL prints as `NULL` and strings are single-quoted.
pub fn render_result(scan: &mut Scan, fields: &[String]) -> Result<String> {
    let mut out = fields.join("|");
    out.push('\n');
    while scan.next()? {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push('|');
            }
            out.push_str(&scan.get_field(field)?.to_string());
        }
        out.push('\n');
    }
    Ok(out)
}

/// Executes a SELECT and returns the positioned-before-first result.
///
/// Sources form a left-deep product. An inner join filters the product of
/// the joined table with everything before it; left and right joins wrap a
/// [LeftJoinScan]. Expression selectors add computed fields, the WHERE
/// clause filters and a final projection hides every field that is not
/// reported.
///
/// # Errors
/// - [DbError::UnknownTable] for an unknown table.
/// - [DbError::AliasCollision] for an alias naming an existing table or two
///   sources with the same name.
/// - [DbError::UnknownAlias], [DbError::FieldNotFound] or
///   [DbError::AmbiguousField] for a field reference that does not resolve
///   to exactly one source.
/// - [DbError::InvalidQuery] for a query with nothing to select, or nothing
///   to select from while it needs rows.
pub fn select(db: &Database, query: &SelectQuery) -> Result<QueryResult> {
    let _span = debug_span!(target: "scandb.exec", "select").entered();

    if query.selectors.is_empty() {
        return Err(DbError::InvalidQuery("empty select list".into()));
    }
    let mut scope = Scope::default();
    let mut sources = Vec::with_capacity(query.sources.len());
    for source in &query.sources {
        match source {
            Source::Table { name, alias } => {
                scope.add_table(db, name, alias.as_deref())?;
                sources.push(Scan::from(db.table_scan(name, alias.as_deref())?));
            }
            Source::Subquery(subquery) => {
                let result = select(db, subquery)?;
                scope.add_subquery(result.fields);
                sources.push(result.scan);
            }
        }
    }
    for join in &query.joins {
        scope.add_table(db, &join.table, join.alias.as_deref())?;
        scope.check_tree(&join.predicate)?;
    }
    for selector in &query.selectors {
        if let Selector::Expr { expr, name } = selector {
            scope.check_tree(expr)?;
            scope.add_computed(name)?;
        }
    }
    for selector in &query.selectors {
        if let Selector::Field(name) = selector {
            scope.check_name(name)?;
        }
    }
    if let Some(predicate) = &query.predicate {
        scope.check_tree(predicate)?;
    }

    let fields = scope.output_fields(&query.selectors);
    let scan = build(db, query, sources)?;
    let mut scan = Scan::from(ProjectScan::new(scan, fields.iter().cloned()));
    scan.before_first()?;
    debug!(target: "scandb.exec", fields = fields.len(), "select planned");
    Ok(QueryResult { fields, scan })
}

fn build(db: &Database, query: &SelectQuery, sources: Vec<Scan>) -> Result<Scan> {
    let mut acc: Option<Scan> = None;
    for scan in sources {
        acc = Some(match acc {
            None => scan,
            Some(lhs) => Scan::from(ProductScan::new(lhs, scan)?),
        });
    }

    for join in &query.joins {
        let Some(lhs) = acc.take() else {
            return Err(DbError::InvalidQuery(format!(
                "JOIN {} without a FROM source",
                join.table
            )));
        };
        let joined = Scan::from(db.table_scan(&join.table, join.alias.as_deref())?);
        let scan = match join.kind {
            JoinKind::Inner => {
                let product = Scan::from(ProductScan::new(joined, lhs)?);
                let predicate = convert_against(&product, &join.predicate)?;
                Scan::from(SelectScan::new(product, predicate))
            }
            JoinKind::Left | JoinKind::Right => {
                let always = Expr::Const(Value::Bool(true));
                let mut scan = if join.kind == JoinKind::Left {
                    LeftJoinScan::left(lhs, joined, always)?
                } else {
                    LeftJoinScan::right(lhs, joined, always)?
                };
                let predicate = convert_against(&scan, &join.predicate)?;
                scan.set_predicate(predicate);
                Scan::from(scan)
            }
        };
        acc = Some(scan);
    }

    for selector in &query.selectors {
        let Selector::Expr { expr, name } = selector else {
            continue;
        };
        let expr = match &acc {
            Some(child) => convert_against(child, expr)?,
            None => ExprTreeConverter::new(NoScanSelector).convert(expr)?,
        };
        acc = Some(Scan::from(ExtendScan::new(acc.take(), expr, name.clone())));
    }

    let Some(scan) = acc else {
        return Err(DbError::InvalidQuery("nothing to select from".into()));
    };
    match &query.predicate {
        None => Ok(scan),
        Some(tree) => {
            let predicate = convert_against(&scan, tree)?;
            Ok(Scan::from(SelectScan::new(scan, predicate)))
        }
    }
}

/// One FROM source or joined table, as seen by name resolution.
struct ScopeEntry {
    /// Table name or alias. Subqueries have none and expose their output
    /// names as they are.
    qualifier: Option<String>,
    fields: Vec<String>,
}

impl ScopeEntry {
    fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Names reported for this entry by `SELECT *`.
    fn star_fields(&self) -> impl Iterator<Item = String> + '_ {
        self.fields.iter().map(|field| match &self.qualifier {
            Some(qualifier) => format!("{qualifier}.{field}"),
            None => field.clone(),
        })
    }
}

/// Names visible to a SELECT, checked before any scan is built.
#[derive(Default)]
struct Scope {
    entries: Vec<ScopeEntry>,
    computed: Vec<String>,
}

impl Scope {
    fn add_table(&mut self, db: &Database, name: &str, alias: Option<&str>) -> Result<()> {
        let schema = db.schema(name)?;
        if let Some(alias) = alias.filter(|a| *a != name && db.exists(a)) {
            return Err(DbError::AliasCollision(alias.to_owned()));
        }
        let qualifier = alias.unwrap_or(name);
        if self
            .entries
            .iter()
            .any(|e| e.qualifier.as_deref() == Some(qualifier))
        {
            return Err(DbError::AliasCollision(qualifier.to_owned()));
        }
        self.entries.push(ScopeEntry {
            qualifier: Some(qualifier.to_owned()),
            fields: schema.field_names().map(str::to_owned).collect(),
        });
        Ok(())
    }

    fn add_subquery(&mut self, fields: Vec<String>) {
        self.entries.push(ScopeEntry {
            qualifier: None,
            fields,
        });
    }

    fn add_computed(&mut self, name: &str) -> Result<()> {
        if self.matches(name) > 0 {
            return Err(DbError::AmbiguousField(name.to_owned()));
        }
        self.computed.push(name.to_owned());
        Ok(())
    }

    /// Number of visible fields called exactly `name`.
    fn matches(&self, name: &str) -> usize {
        let unqualified = self
            .entries
            .iter()
            .filter(|e| e.qualifier.is_none() || !name.contains('.'))
            .filter(|e| e.contains(name))
            .count();
        unqualified + self.computed.iter().filter(|c| *c == name).count()
    }

    fn check_name(&self, name: &str) -> Result<()> {
        let exact = self.matches(name);
        let qualified = QualifiedName::parse(name);
        match qualified.table {
            // A subquery or computed field may itself be named `t.a`.
            Some(_) if exact > 0 => Ok(()),
            Some(table) => {
                let entry = self
                    .entries
                    .iter()
                    .find(|e| e.qualifier.as_deref() == Some(table))
                    .ok_or_else(|| DbError::UnknownAlias(table.to_owned()))?;
                if entry.contains(qualified.field) {
                    Ok(())
                } else {
                    Err(DbError::FieldNotFound(name.to_owned()))
                }
            }
            None => match exact {
                0 => Err(DbError::FieldNotFound(name.to_owned())),
                1 => Ok(()),
                _ => Err(DbError::AmbiguousField(name.to_owned())),
            },
        }
    }

    fn check_tree(&self, tree: &FactorTree) -> Result<()> {
        match &tree.factor {
            Factor::Const(_) => Ok(()),
            Factor::Field(name) => self.check_name(name),
            Factor::Tree(tree) => tree.factors.iter().try_for_each(|f| self.check_tree(f)),
        }
    }

    fn output_fields(&self, selectors: &[Selector]) -> Vec<String> {
        let mut fields = Vec::new();
        for selector in selectors {
            match selector {
                Selector::All => {
                    fields.extend(self.entries.iter().flat_map(ScopeEntry::star_fields));
                }
                Selector::Field(name) | Selector::Expr { name, .. } => fields.push(name.clone()),
            }
        }
        fields
    }
}
