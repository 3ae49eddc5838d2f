//! Statement executors.
//!
//! Each executor validates its statement against the [Database], builds the
//! scans it needs and applies the change through them. There is no
//! rollback: rows written before an error stay written.
//!
//! [Database]: crate::database::Database

mod checks;
mod create_table;
mod delete;
mod drop_table;
mod insert;
mod select;
mod update;

pub use create_table::create_table;
pub use delete::delete;
pub use drop_table::drop_table;
pub use insert::insert;
pub use select::{QueryResult, render_result, select};
pub use update::update;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::database::Database;
    use crate::expr::{FactorTree, GenBinOp};
    use crate::query::{CreateTableQuery, InsertQuery, SelectQuery, Statement};
    use crate::schema::ColumnDef;
    use crate::value::Value;

    pub fn strs(values: &[&str]) -> Vec<FactorTree> {
        values.iter().map(|s| FactorTree::string(*s)).collect()
    }

    pub fn eq_field_str(field: &str, value: &str) -> FactorTree {
        FactorTree::binary(GenBinOp::Eq, FactorTree::field(field), FactorTree::string(value))
    }

    /// `people(first_name PK, last_name)` holding Egor Letov and John
    /// Lennon, and `songs(name PK REFERENCES people(first_name), song INT)`.
    pub fn people_and_songs() -> Database {
        let mut db = Database::new();
        db.execute(&Statement::CreateTable(
            CreateTableQuery::new("people")
                .column(ColumnDef::varchar("first_name", 255).primary_key())
                .column(ColumnDef::varchar("last_name", 255)),
        ))
        .unwrap();
        db.execute(&Statement::CreateTable(
            CreateTableQuery::new("songs")
                .column(ColumnDef::varchar("name", 255).primary_key())
                .column(ColumnDef::int("song"))
                .foreign_key("name", "people", "first_name"),
        ))
        .unwrap();
        db.execute(&Statement::Insert(
            InsertQuery::new("people")
                .row(strs(&["Egor", "Letov"]))
                .row(strs(&["John", "Lennon"])),
        ))
        .unwrap();
        db
    }

    pub fn rows(db: &Database, table: &str, fields: &[&str]) -> Vec<Vec<Value>> {
        let mut query = SelectQuery::new().from(table);
        for field in fields {
            query = query.field(*field);
        }
        db.query(&query).unwrap().collect_rows().unwrap()
    }
}
