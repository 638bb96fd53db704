//! Compile the same query and blueprint for every dialect.
//!
//! ```bash
//! cargo run --example sql_builder
//! ```

use quarry::grammar::{Grammar, MySqlGrammar, PostgresGrammar, SqliteGrammar};
use quarry::schema::grammar::{
    MySqlSchemaGrammar, PostgresSchemaGrammar, SchemaGrammar, SqliteSchemaGrammar,
};
use quarry::{Blueprint, QueryBuilder};

fn main() -> quarry::Result<()> {
    let query = QueryBuilder::new("users")
        .select(&["users.id", "users.email"])
        .left_join("roles", "users.role_id", "=", "roles.id")
        .and_eq("users.status", "active")
        .where_in("roles.id", vec![1, 2, 3])
        .order_by_desc("users.created_at")
        .limit(10);

    let grammars: Vec<(&str, Box<dyn Grammar>)> = vec![
        ("mysql", Box::new(MySqlGrammar::new())),
        ("pgsql", Box::new(PostgresGrammar::new())),
        ("sqlite", Box::new(SqliteGrammar::new())),
    ];
    println!("-- select ({} bindings)", query.bindings().len());
    for (name, grammar) in &grammars {
        println!("{name:>7}: {}", grammar.compile_select(&query)?);
    }

    let mut blueprint = Blueprint::new("users");
    blueprint.create = true;
    blueprint.id();
    blueprint.string("email").unique();
    blueprint.boolean("active").default(true);
    blueprint.timestamps();

    let schema_grammars: Vec<(&str, Box<dyn SchemaGrammar>)> = vec![
        ("mysql", Box::new(MySqlSchemaGrammar::new())),
        ("pgsql", Box::new(PostgresSchemaGrammar::new())),
        ("sqlite", Box::new(SqliteSchemaGrammar::new())),
    ];
    println!("\n-- create table");
    for (name, grammar) in &schema_grammars {
        for statement in grammar.compile_create(&blueprint)? {
            println!("{name:>7}: {statement}");
        }
    }
    Ok(())
}
