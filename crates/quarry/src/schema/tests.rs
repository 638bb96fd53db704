use super::grammar::{
    MySqlSchemaGrammar, PostgresSchemaGrammar, SchemaGrammar, SqliteSchemaGrammar,
};
use super::*;
use crate::value::Value;

fn users_blueprint() -> Blueprint {
    let mut bp = Blueprint::new("users");
    bp.id();
    bp.string("email").unique();
    bp.timestamps();
    bp
}

#[test]
fn test_mysql_create_is_one_statement_with_inline_keys() {
    let statements = MySqlSchemaGrammar::new()
        .compile_create(&users_blueprint())
        .unwrap();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0],
        "CREATE TABLE `users` (\
         `id` bigint unsigned NOT NULL AUTO_INCREMENT PRIMARY KEY, \
         `email` varchar(255) NOT NULL, \
         `created_at` timestamp NULL, \
         `updated_at` timestamp NULL, \
         UNIQUE KEY `users_email_unique` (`email`))"
    );
}

#[test]
fn test_sqlite_create_uses_autoincrement_and_separate_index() {
    let statements = SqliteSchemaGrammar::new()
        .compile_create(&users_blueprint())
        .unwrap();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
    assert!(statements[0].contains("\"created_at\" datetime NULL"));
    assert_eq!(
        statements[1],
        "CREATE UNIQUE INDEX \"users_email_unique\" ON \"users\" (\"email\")"
    );
}

#[test]
fn test_postgres_create_uses_bigserial_and_separate_index() {
    let statements = PostgresSchemaGrammar::new()
        .compile_create(&users_blueprint())
        .unwrap();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].contains("\"id\" bigserial PRIMARY KEY"));
    assert_eq!(
        statements[1],
        "CREATE UNIQUE INDEX \"users_email_unique\" ON \"users\" (\"email\")"
    );
}

#[test]
fn test_foreign_key_placement_per_dialect() {
    let mut bp = Blueprint::new("posts");
    bp.id();
    bp.big_integer("user_id").unsigned();
    bp.foreign("user_id")
        .references("id")
        .on("users")
        .on_delete("cascade");

    let mysql = MySqlSchemaGrammar::new().compile_create(&bp).unwrap();
    assert_eq!(mysql.len(), 1);
    assert!(mysql[0].contains(
        "CONSTRAINT `posts_user_id_foreign` FOREIGN KEY (`user_id`) \
         REFERENCES `users` (`id`) ON DELETE CASCADE"
    ));

    let postgres = PostgresSchemaGrammar::new().compile_create(&bp).unwrap();
    assert_eq!(
        postgres[1],
        "ALTER TABLE \"posts\" ADD CONSTRAINT \"posts_user_id_foreign\" \
         FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\") ON DELETE CASCADE"
    );

    let sqlite = SqliteSchemaGrammar::new().compile_create(&bp).unwrap();
    assert_eq!(sqlite.len(), 1);
    assert!(sqlite[0].contains(
        "FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\") ON DELETE CASCADE"
    ));
}

#[test]
fn test_incomplete_foreign_key_fails_before_any_sql() {
    let mut bp = Blueprint::new("posts");
    bp.big_integer("user_id");
    bp.foreign("user_id").references("id");
    let err = MySqlSchemaGrammar::new().compile_create(&bp).unwrap_err();
    assert!(err.to_string().contains("posts_user_id_foreign"));
}

#[test]
fn test_alter_sequences_destructive_before_additive() {
    let mut bp = Blueprint::new("posts");
    bp.string("nickname").nullable();
    bp.index(&["nickname"], None);
    bp.foreign("team_id").references("id").on("teams");
    bp.drop_foreign_on("user_id");
    bp.drop_unique(&["email"]);
    bp.drop_column("legacy");
    bp.rename_column("title", "headline");

    let statements = MySqlSchemaGrammar::new().compile_alter(&bp).unwrap();
    assert_eq!(
        statements,
        vec![
            "ALTER TABLE `posts` DROP FOREIGN KEY `posts_user_id_foreign`".to_string(),
            "ALTER TABLE `posts` DROP INDEX `posts_email_unique`".to_string(),
            "ALTER TABLE `posts` DROP COLUMN `legacy`".to_string(),
            "ALTER TABLE `posts` RENAME COLUMN `title` TO `headline`".to_string(),
            "ALTER TABLE `posts` ADD COLUMN `nickname` varchar(255) NULL".to_string(),
            "ALTER TABLE `posts` ADD KEY `posts_nickname_index` (`nickname`)".to_string(),
            "ALTER TABLE `posts` ADD CONSTRAINT `posts_team_id_foreign` \
             FOREIGN KEY (`team_id`) REFERENCES `teams` (`id`)"
                .to_string(),
        ]
    );
}

#[test]
fn test_mysql_modify_column() {
    let mut bp = Blueprint::new("users");
    bp.string_with_length("email", 512).nullable().change();
    let statements = MySqlSchemaGrammar::new().compile_alter(&bp).unwrap();
    assert_eq!(
        statements,
        vec!["ALTER TABLE `users` MODIFY `email` varchar(512) NULL".to_string()]
    );
}

#[test]
fn test_postgres_modify_column_splits_statements() {
    let mut bp = Blueprint::new("users");
    bp.string_with_length("email", 512).nullable().change();
    let statements = PostgresSchemaGrammar::new().compile_alter(&bp).unwrap();
    assert_eq!(
        statements,
        vec![
            "ALTER TABLE \"users\" ALTER COLUMN \"email\" TYPE varchar(512)".to_string(),
            "ALTER TABLE \"users\" ALTER COLUMN \"email\" DROP NOT NULL".to_string(),
            "ALTER TABLE \"users\" ALTER COLUMN \"email\" DROP DEFAULT".to_string(),
        ]
    );
}

#[test]
fn test_sqlite_rejects_unexpressible_alters() {
    let mut modify = Blueprint::new("users");
    modify.string("email").change();
    assert!(SqliteSchemaGrammar::new()
        .compile_alter(&modify)
        .unwrap_err()
        .is_unsupported());

    let mut drop_fk = Blueprint::new("posts");
    drop_fk.drop_foreign_on("user_id");
    assert!(SqliteSchemaGrammar::new()
        .compile_alter(&drop_fk)
        .unwrap_err()
        .is_unsupported());

    let mut add_fk = Blueprint::new("posts");
    add_fk.big_integer("team_id").nullable();
    add_fk.foreign("team_id").references("id").on("teams");
    assert!(SqliteSchemaGrammar::new()
        .compile_alter(&add_fk)
        .unwrap_err()
        .is_unsupported());
}

#[test]
fn test_default_value_formatting() {
    let mut bp = Blueprint::new("flags");
    bp.boolean("enabled").default(true);
    bp.integer("weight").default(10);
    bp.string("status").default("pend'ing");
    bp.timestamp("seen_at").default("current_timestamp");

    let mysql = MySqlSchemaGrammar::new().compile_create(&bp).unwrap();
    assert!(mysql[0].contains("`enabled` tinyint(1) NOT NULL DEFAULT 1"));
    assert!(mysql[0].contains("`weight` int NOT NULL DEFAULT 10"));
    assert!(mysql[0].contains("`status` varchar(255) NOT NULL DEFAULT 'pend''ing'"));
    assert!(mysql[0].contains("`seen_at` timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP"));

    let postgres = PostgresSchemaGrammar::new().compile_create(&bp).unwrap();
    assert!(postgres[0].contains("\"enabled\" boolean NOT NULL DEFAULT true"));
}

#[test]
fn test_enum_and_set_types() {
    let mut bp = Blueprint::new("tickets");
    bp.enumeration("state", &["open", "closed"]);

    let mysql = MySqlSchemaGrammar::new().compile_create(&bp).unwrap();
    assert!(mysql[0].contains("`state` enum('open', 'closed') NOT NULL"));

    let postgres = PostgresSchemaGrammar::new().compile_create(&bp).unwrap();
    assert!(postgres[0].contains("varchar(255) CHECK (\"state\" IN ('open', 'closed'))"));

    let mut with_set = Blueprint::new("tickets");
    with_set.set("tags", &["a", "b"]);
    assert!(MySqlSchemaGrammar::new().compile_create(&with_set).is_ok());
    assert!(PostgresSchemaGrammar::new()
        .compile_create(&with_set)
        .unwrap_err()
        .is_unsupported());
    assert!(SqliteSchemaGrammar::new()
        .compile_create(&with_set)
        .unwrap_err()
        .is_unsupported());
}

#[test]
fn test_table_options_apply_where_supported() {
    let mut bp = Blueprint::new("logs");
    bp.id();
    bp.engine("InnoDB");
    bp.table_charset("utf8mb4");
    bp.table_comment("audit log");

    let mysql = MySqlSchemaGrammar::new().compile_create(&bp).unwrap();
    assert!(mysql[0].ends_with(
        "ENGINE = InnoDB DEFAULT CHARACTER SET utf8mb4 COMMENT = 'audit log'"
    ));

    // Engine/charset silently omitted; the comment gets its own statement.
    let postgres = PostgresSchemaGrammar::new().compile_create(&bp).unwrap();
    assert!(!postgres[0].contains("InnoDB"));
    assert_eq!(
        postgres[1],
        "COMMENT ON TABLE \"logs\" IS 'audit log'"
    );

    let sqlite = SqliteSchemaGrammar::new().compile_create(&bp).unwrap();
    assert!(!sqlite.iter().any(|s| s.contains("InnoDB") || s.contains("audit log")));
}

#[test]
fn test_composite_primary_key() {
    let mut bp = Blueprint::new("post_tag");
    bp.big_integer("post_id");
    bp.big_integer("tag_id");
    bp.primary(&["post_id", "tag_id"]);

    let mysql = MySqlSchemaGrammar::new().compile_create(&bp).unwrap();
    assert!(mysql[0].contains("PRIMARY KEY (`post_id`, `tag_id`)"));

    let sqlite = SqliteSchemaGrammar::new().compile_create(&bp).unwrap();
    assert!(sqlite[0].contains("PRIMARY KEY (\"post_id\", \"tag_id\")"));
}

#[test]
fn test_schema_compile_routes_create_vs_alter() {
    let mut schema = Schema::new();
    schema.create("users", |t| {
        t.id();
    });
    schema.table("users", |t| {
        t.string("email").nullable();
    });
    schema.drop_if_exists("sessions");
    schema.rename("users", "people");

    let statements = schema.compile(&MySqlSchemaGrammar::new()).unwrap();
    assert_eq!(statements.len(), 4);
    assert!(statements[0].starts_with("CREATE TABLE `users`"));
    assert!(statements[1].starts_with("ALTER TABLE `users` ADD COLUMN"));
    assert_eq!(statements[2], "DROP TABLE IF EXISTS `sessions`");
    assert_eq!(statements[3], "RENAME TABLE `users` TO `people`");
}

#[test]
fn test_introspection_statements_bind_the_table_name() {
    let (sql, bindings) = SqliteSchemaGrammar::new().compile_has_table("users");
    assert_eq!(
        sql,
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?"
    );
    assert_eq!(bindings, vec![Value::Str("users".into())]);

    let (sql, _) = MySqlSchemaGrammar::new().compile_get_columns("users");
    assert!(sql.contains("information_schema.columns"));
    assert!(sql.contains("ORDER BY ordinal_position"));

    let (sql, _) = PostgresSchemaGrammar::new().compile_has_table("users");
    assert!(sql.contains("current_schema()"));
}
