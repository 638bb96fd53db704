use super::*;
use crate::grammar::{Grammar, MySqlGrammar, PostgresGrammar, SqliteGrammar};

fn placeholders(sql: &str) -> usize {
    sql.matches('?').count()
}

#[test]
fn test_simple_select() {
    let qb = QueryBuilder::new("users");
    let sql = MySqlGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(sql, "SELECT * FROM `users`");
}

#[test]
fn test_select_columns_and_distinct() {
    let qb = QueryBuilder::new("users")
        .select(&["id", "email"])
        .distinct();
    let sql = PostgresGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(sql, "SELECT DISTINCT \"id\", \"email\" FROM \"users\"");
}

#[test]
fn test_where_in_bindings_match_placeholders() {
    let qb = QueryBuilder::new("users").where_in("id", vec![1, 2, 3]);
    for grammar in [
        Box::new(MySqlGrammar::new()) as Box<dyn Grammar>,
        Box::new(PostgresGrammar::new()),
        Box::new(SqliteGrammar::new()),
    ] {
        let sql = grammar.compile_select(&qb).unwrap();
        assert!(sql.contains("IN (?, ?, ?)"), "sql was: {sql}");
        assert_eq!(placeholders(&sql), 3);
    }
    assert_eq!(
        qb.bindings(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn test_where_in_empty_compiles_to_false() {
    let qb = QueryBuilder::new("users").where_in("id", Vec::<i64>::new());
    let sql = MySqlGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(sql, "SELECT * FROM `users` WHERE 1 = 0");
    assert!(qb.bindings().is_empty());
}

#[test]
fn test_where_not_in_empty_is_always_true() {
    let qb = QueryBuilder::new("users").where_not_in("id", Vec::<i64>::new());
    let sql = MySqlGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(sql, "SELECT * FROM `users` WHERE 1 = 1");
}

#[test]
fn test_placeholder_count_equals_binding_count() {
    let qb = QueryBuilder::new("orders")
        .and_eq("status", "paid")
        .where_in("region", vec!["eu", "us"])
        .where_between("total", 10, 500)
        .where_null("deleted_at")
        .where_raw("(tax = ? OR tax IS NULL)", vec![0])
        .where_group(|q| q.and_eq("a", 1).or_eq("b", 2))
        .having("count(*)", ">", 5)
        .group_by(&["region"]);
    let sql = PostgresGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(placeholders(&sql), qb.bindings().len());
}

#[test]
fn test_nested_group_is_parenthesized_compile_of_its_clauses() {
    let flat = QueryBuilder::new("users").and_eq("a", 1).or_eq("b", 2);
    let nested = QueryBuilder::new("users").where_group(|q| q.and_eq("a", 1).or_eq("b", 2));

    let grammar = MySqlGrammar::new();
    let flat_sql = grammar.compile_select(&flat).unwrap();
    let nested_sql = grammar.compile_select(&nested).unwrap();

    let flat_wheres = flat_sql.split(" WHERE ").nth(1).unwrap();
    let nested_wheres = nested_sql.split(" WHERE ").nth(1).unwrap();
    assert_eq!(nested_wheres, format!("({flat_wheres})"));
    assert_eq!(flat.bindings(), nested.bindings());
}

#[test]
fn test_nested_groups_apply_connector_rule_at_every_depth() {
    let qb = QueryBuilder::new("users").and_eq("status", "active").or_where_group(|q| {
        q.and_eq("role", "admin")
            .where_group(|q| q.and_eq("a", 1).or_eq("b", 2))
    });
    let sql = SqliteGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM \"users\" WHERE \"status\" = ? \
         OR (\"role\" = ? AND (\"a\" = ? OR \"b\" = ?))"
    );
    assert_eq!(placeholders(&sql), qb.bindings().len());
}

#[test]
fn test_unknown_operator_is_fatal() {
    let qb = QueryBuilder::new("users").and_where("name", "SOUNDS WRONG", "x");
    let err = MySqlGrammar::new().compile_select(&qb).unwrap_err();
    assert!(err.is_unsupported());
    assert!(err.to_string().contains("SOUNDS WRONG"));
}

#[test]
fn test_dialect_specific_operators() {
    let qb = QueryBuilder::new("users").and_where("email", "ilike", "%a%");
    assert!(PostgresGrammar::new().compile_select(&qb).is_ok());
    assert!(MySqlGrammar::new().compile_select(&qb).unwrap_err().is_unsupported());
}

#[test]
fn test_wrap_aliases_stars_and_embedded_quotes() {
    let grammar = MySqlGrammar::new();
    assert_eq!(grammar.wrap("*"), "*");
    assert_eq!(grammar.wrap("users.*"), "`users`.*");
    assert_eq!(grammar.wrap("users.id"), "`users`.`id`");
    assert_eq!(grammar.wrap("id as user_id"), "`id` AS `user_id`");
    assert_eq!(grammar.wrap("we`ird"), "`we``ird`");

    let pg = PostgresGrammar::new();
    assert_eq!(pg.wrap("he\"re"), "\"he\"\"re\"");
}

#[test]
fn test_joins() {
    let qb = QueryBuilder::new("users")
        .select(&["users.*", "roles.name as role_name"])
        .left_join("roles", "users.role_id", "=", "roles.id");
    let sql = MySqlGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(
        sql,
        "SELECT `users`.*, `roles`.`name` AS `role_name` FROM `users` \
         LEFT JOIN `roles` ON `users`.`role_id` = `roles`.`id`"
    );
}

#[test]
fn test_group_having_order_limit_offset() {
    let qb = QueryBuilder::new("orders")
        .select(&["region", "count(*) as total"])
        .group_by(&["region"])
        .having("count(*)", ">", 5)
        .order_by_desc("total")
        .limit(20)
        .offset(40);
    let sql = PostgresGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(
        sql,
        "SELECT \"region\", count(*) as total FROM \"orders\" GROUP BY \"region\" \
         HAVING count(*) > ? ORDER BY \"total\" DESC LIMIT 20 OFFSET 40"
    );
}

#[test]
fn test_sqlite_offset_without_limit() {
    let qb = QueryBuilder::new("users").offset(10);
    let sql = SqliteGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\" LIMIT -1 OFFSET 10");

    let sql = MySqlGrammar::new().compile_select(&qb).unwrap();
    assert_eq!(sql, "SELECT * FROM `users` OFFSET 10");
}

#[test]
fn test_insert_multi_row_binding_order() {
    let grammar = MySqlGrammar::new();
    let rows = vec![
        vec![
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(2)),
        ],
        vec![
            ("a".to_string(), Value::Int(3)),
            ("b".to_string(), Value::Int(4)),
        ],
    ];
    let columns = vec!["a".to_string(), "b".to_string()];
    let (sql, bindings) = grammar.compile_insert("t", &columns, &rows).unwrap();
    assert_eq!(sql, "INSERT INTO `t` (`a`, `b`) VALUES (?, ?), (?, ?)");
    assert_eq!(
        bindings,
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn test_insert_rejects_mismatched_rows() {
    let grammar = MySqlGrammar::new();
    let rows = vec![
        vec![("a".to_string(), Value::Int(1))],
        vec![("b".to_string(), Value::Int(2))],
    ];
    let columns = vec!["a".to_string()];
    assert!(grammar.compile_insert("t", &columns, &rows).is_err());
}

#[test]
fn test_update_bindings_are_sets_then_wheres() {
    let qb = QueryBuilder::new("users").and_eq("id", 7);
    let sets = vec![("email".to_string(), Value::Str("x@y.z".into()))];
    let (sql, bindings) = PostgresGrammar::new().compile_update(&qb, &sets).unwrap();
    assert_eq!(
        sql,
        "UPDATE \"users\" SET \"email\" = ? WHERE \"id\" = ?"
    );
    assert_eq!(
        bindings,
        vec![Value::Str("x@y.z".into()), Value::Int(7)]
    );
}

#[test]
fn test_delete() {
    let qb = QueryBuilder::new("users").and_eq("id", 1);
    let sql = SqliteGrammar::new().compile_delete(&qb).unwrap();
    assert_eq!(sql, "DELETE FROM \"users\" WHERE \"id\" = ?");
}

#[test]
fn test_upsert_mysql_uses_duplicate_key() {
    let rows = vec![vec![
        ("email".to_string(), Value::Str("a@b.c".into())),
        ("name".to_string(), Value::Str("a".into())),
    ]];
    let columns = vec!["email".to_string(), "name".to_string()];
    let (sql, _) = MySqlGrammar::new()
        .compile_upsert("users", &columns, &rows, &[], &["name"])
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `users` (`email`, `name`) VALUES (?, ?) \
         ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"
    );
}

#[test]
fn test_upsert_conflict_family_requires_conflict_columns() {
    let rows = vec![vec![
        ("email".to_string(), Value::Str("a@b.c".into())),
        ("name".to_string(), Value::Str("a".into())),
    ]];
    let columns = vec!["email".to_string(), "name".to_string()];

    let err = PostgresGrammar::new()
        .compile_upsert("users", &columns, &rows, &[], &["name"])
        .unwrap_err();
    assert!(err.is_unsupported());

    let (sql, _) = SqliteGrammar::new()
        .compile_upsert("users", &columns, &rows, &["email"], &["name"])
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"users\" (\"email\", \"name\") VALUES (?, ?) \
         ON CONFLICT (\"email\") DO UPDATE SET \"name\" = excluded.\"name\""
    );
}

#[test]
fn test_truncate_sqlite_resets_sequence() {
    let statements = SqliteGrammar::new().compile_truncate("users");
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].0, "DELETE FROM \"users\"");
    assert_eq!(statements[1].0, "DELETE FROM sqlite_sequence WHERE name = ?");
    assert_eq!(statements[1].1, vec![Value::Str("users".into())]);

    let statements = MySqlGrammar::new().compile_truncate("users");
    assert_eq!(statements[0].0, "TRUNCATE TABLE `users`");
}
