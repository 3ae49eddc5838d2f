use scandb::query::{CreateTableQuery, InsertQuery, JoinKind, SelectQuery, Statement};
use scandb::{ColumnDef, Database, FactorTree, GenBinOp, Result};

fn strs(values: &[&str]) -> Vec<FactorTree> {
    values.iter().map(|s| FactorTree::string(*s)).collect()
}

fn run() -> Result<()> {
    let mut db = Database::new();
    db.execute(&Statement::CreateTable(
        CreateTableQuery::new("people")
            .column(ColumnDef::varchar("first_name", 255).primary_key())
            .column(ColumnDef::varchar("last_name", 255)),
    ))?;
    db.execute(&Statement::CreateTable(
        CreateTableQuery::new("songs")
            .column(ColumnDef::varchar("name", 255).primary_key())
            .column(ColumnDef::int("song")),
    ))?;
    db.execute(&Statement::Insert(
        InsertQuery::new("people")
            .row(strs(&["Egor", "Letov"]))
            .row(strs(&["John", "Lennon"]))
            .row(strs(&["Noname", ""])),
    ))?;
    db.execute(&Statement::Insert(
        InsertQuery::new("songs")
            .row(vec![FactorTree::string("Egor"), FactorTree::int(5)])
            .row(vec![FactorTree::string("Noname"), FactorTree::int(100)]),
    ))?;

    let query = SelectQuery::new()
        .field("first_name")
        .field("last_name")
        .field("song")
        .from("people")
        .join(
            JoinKind::Left,
            "songs",
            Some("t"),
            FactorTree::binary(
                GenBinOp::Eq,
                FactorTree::field("t.name"),
                FactorTree::field("people.first_name"),
            ),
        );
    print!("{}", db.query(&query)?.render()?);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
