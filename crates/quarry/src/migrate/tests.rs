use std::sync::Arc;

use super::*;
use crate::error::Error;
use crate::schema::Schema;

struct CreateUsers;

impl Migration for CreateUsers {
    fn name(&self) -> &str {
        "0001_create_users"
    }

    fn up(&self, schema: &mut Schema) {
        schema.create("users", |t| {
            t.id();
            t.string("email").unique();
        });
    }

    fn down(&self, schema: &mut Schema) {
        schema.drop("users");
    }
}

struct CreatePosts;

impl Migration for CreatePosts {
    fn name(&self) -> &str {
        "0000_create_posts"
    }

    fn up(&self, schema: &mut Schema) {
        schema.create("posts", |t| {
            t.id();
            t.big_integer("user_id").unsigned();
            t.foreign("user_id").references("id").on("users");
        });
    }

    fn down(&self, schema: &mut Schema) {
        schema.drop("posts");
    }

    fn depends_on(&self) -> Vec<String> {
        vec!["0001_create_users".to_string()]
    }
}

struct CycleA;

impl Migration for CycleA {
    fn name(&self) -> &str {
        "a"
    }
    fn up(&self, _schema: &mut Schema) {}
    fn down(&self, _schema: &mut Schema) {}
    fn depends_on(&self) -> Vec<String> {
        vec!["b".to_string()]
    }
}

struct CycleB;

impl Migration for CycleB {
    fn name(&self) -> &str {
        "b"
    }
    fn up(&self, _schema: &mut Schema) {}
    fn down(&self, _schema: &mut Schema) {}
    fn depends_on(&self) -> Vec<String> {
        vec!["a".to_string()]
    }
}

#[test]
fn checksum_is_stable_across_calls() {
    let first = checksum(&CreateUsers).unwrap();
    let second = checksum(&CreateUsers).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn checksum_distinguishes_migrations() {
    assert_ne!(checksum(&CreateUsers).unwrap(), checksum(&CreatePosts).unwrap());
}

#[test]
fn canonical_source_renders_up_and_down() {
    let source = canonical_source(&CreateUsers).unwrap();
    assert!(source.starts_with("0001_create_users\n"));
    assert!(source.contains("-- up\nCREATE TABLE `users`"));
    assert!(source.contains("-- down\nDROP TABLE `users`"));
}

#[test]
fn dependencies_reorder_lexicographic_input() {
    // 0000_create_posts sorts first but depends on 0001_create_users.
    let pending: Vec<Arc<dyn Migration>> = vec![Arc::new(CreatePosts), Arc::new(CreateUsers)];
    let ordered = resolve_order(&pending).unwrap();
    let names: Vec<&str> = ordered.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["0001_create_users", "0000_create_posts"]);
}

#[test]
fn dependency_outside_pending_set_is_skipped() {
    let pending: Vec<Arc<dyn Migration>> = vec![Arc::new(CreatePosts)];
    let ordered = resolve_order(&pending).unwrap();
    assert_eq!(ordered.len(), 1);
    assert_eq!(ordered[0].name(), "0000_create_posts");
}

#[test]
fn cyclic_dependency_is_fatal_before_execution() {
    let pending: Vec<Arc<dyn Migration>> = vec![Arc::new(CycleA), Arc::new(CycleB)];
    let err = resolve_order(&pending).unwrap_err();
    assert!(matches!(err, Error::CircularDependency(_)));
}

#[test]
fn verify_dependencies_rejects_unknown_names() {
    let migrations: Vec<Arc<dyn Migration>> = vec![Arc::new(CreatePosts)];
    let err = verify_dependencies(&migrations, &Default::default()).unwrap_err();
    assert!(err.to_string().contains("0001_create_users"));

    let mut applied = std::collections::HashSet::new();
    applied.insert("0001_create_users".to_string());
    assert!(verify_dependencies(&migrations, &applied).is_ok());
}
