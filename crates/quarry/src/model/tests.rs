use super::*;
use crate::row::Row;
use crate::value::Value;

fn row() -> Row {
    Row::from_pairs([
        ("id", Value::Int(1)),
        ("email", Value::Str("a@b.c".into())),
        ("status", Value::Str("active".into())),
    ])
}

#[test]
fn hydrated_models_exist_and_are_clean() {
    let model = Model::from_row("users", &row());
    assert!(model.exists());
    assert!(!model.is_dirty());
    assert_eq!(model.get("email"), Some(&Value::Str("a@b.c".into())));
    assert_eq!(model.key(), Some(&Value::Int(1)));
}

#[test]
fn set_marks_dirty_until_saved() {
    let mut model = Model::from_row("users", &row());
    model.set("email", "new@b.c");
    assert!(model.is_dirty());
    assert_eq!(
        model.dirty(),
        vec![("email".to_string(), Value::Str("new@b.c".into()))]
    );

    // Setting back to the original clears the dirty state.
    model.set("email", "a@b.c");
    assert!(!model.is_dirty());
}

#[test]
fn new_models_do_not_exist() {
    let mut model = Model::new("users");
    assert!(!model.exists());
    model.set("email", "a@b.c");
    assert_eq!(model.dirty().len(), 1);
}

#[test]
fn fillable_truth_table() {
    let config = ModelConfig::default();

    // Listed in fillable: allowed, everything else rejected.
    let model = Model::new("users").fillable(&["email"]);
    assert!(model.is_fillable("email", &config));
    assert!(!model.is_fillable("role", &config));

    // Fillable empty, guarded lists the key: rejected.
    let model = Model::new("users").guarded(&["role"]);
    assert!(!model.is_fillable("role", &config));
    assert!(model.is_fillable("email", &config));

    // Guarded "*": nothing unlisted is fillable.
    let model = Model::new("users").guarded(&["*"]);
    assert!(!model.is_fillable("email", &config));

    // Fillable wins over guarded "*" for listed keys.
    let model = Model::new("users").fillable(&["email"]).guarded(&["*"]);
    assert!(model.is_fillable("email", &config));
    assert!(!model.is_fillable("role", &config));

    // Both empty: falls back to the session policy.
    let model = Model::new("users");
    assert!(model.is_fillable("email", &config));
    let strict = ModelConfig {
        allow_unguarded: false,
        ..ModelConfig::default()
    };
    assert!(!model.is_fillable("email", &strict));
}

#[test]
fn fill_rejects_guarded_attributes() {
    let config = ModelConfig::default();
    let mut model = Model::new("users").guarded(&["role"]);
    let err = model
        .fill(
            vec![
                ("email".to_string(), Value::Str("a@b.c".into())),
                ("role".to_string(), Value::Str("admin".into())),
            ],
            &config,
        )
        .unwrap_err();
    assert!(matches!(err, crate::Error::MassAssignment(key) if key == "role"));
}

#[test]
fn fill_assigns_fillable_attributes() {
    let config = ModelConfig::default();
    let mut model = Model::new("users").fillable(&["email", "status"]);
    model
        .fill(
            vec![("email".to_string(), Value::Str("a@b.c".into()))],
            &config,
        )
        .unwrap();
    assert_eq!(model.get("email"), Some(&Value::Str("a@b.c".into())));
}

#[test]
fn relations_are_tracked_by_name() {
    let mut model = Model::from_row("users", &row());
    assert!(!model.relation_loaded("posts"));
    model.set_relation("posts", Related::Many(Vec::new()));
    assert!(model.relation_loaded("posts"));
    assert_eq!(model.relation("posts"), Some(&Related::Many(Vec::new())));
}
