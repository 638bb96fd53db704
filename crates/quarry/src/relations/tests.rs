use super::*;
use crate::grammar::{Grammar, MySqlGrammar};
use crate::model::{Model, Related};
use crate::row::Row;
use crate::value::Value;

fn user(id: i64) -> Model {
    Model::from_row(
        "users",
        &Row::from_pairs([("id", Value::Int(id))]),
    )
}

fn post(id: i64, user_id: Value) -> Model {
    Model::from_row(
        "posts",
        &Row::from_pairs([("id", Value::Int(id)), ("user_id", user_id)]),
    )
}

#[test]
fn eager_constraints_dedupe_parent_keys() {
    let relation = Relation::has_many("posts", "user_id", "id");
    let parents = vec![user(1), user(2), user(1), user(3)];
    let query = relation.add_eager_constraints(&parents);
    assert_eq!(
        query.bindings(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
    let sql = MySqlGrammar::new().compile_select(&query).unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM `posts` WHERE `user_id` IN (?, ?, ?)"
    );
}

#[test]
fn null_parent_keys_are_skipped() {
    let relation = Relation::belongs_to("users", "user_id", "id");
    let parents = vec![post(1, Value::Null), post(2, Value::Int(5))];
    let query = relation.add_eager_constraints(&parents);
    assert_eq!(query.bindings(), vec![Value::Int(5)]);
}

#[test]
fn has_many_matching_assigns_each_parent_its_children() {
    let relation = Relation::has_many("posts", "user_id", "id");
    let mut parents = vec![user(1), user(2), user(3)];
    let results = vec![post(10, Value::Int(1)), post(11, Value::Int(2)), post(12, Value::Int(1))];

    relation
        .match_models(&mut parents, results, "posts")
        .unwrap();

    let Related::Many(first) = parents[0].relation("posts").unwrap() else {
        panic!("expected many");
    };
    assert_eq!(first.len(), 2);

    let Related::Many(third) = parents[2].relation("posts").unwrap() else {
        panic!("expected many");
    };
    assert!(third.is_empty());
}

#[test]
fn has_one_matching_keeps_the_first_row_per_key() {
    let relation = Relation::has_one("profiles", "user_id", "id");
    let mut parents = vec![user(1)];
    let first = Model::from_row(
        "profiles",
        &Row::from_pairs([("id", Value::Int(100)), ("user_id", Value::Int(1))]),
    );
    let second = Model::from_row(
        "profiles",
        &Row::from_pairs([("id", Value::Int(101)), ("user_id", Value::Int(1))]),
    );

    relation
        .match_models(&mut parents, vec![first, second], "profile")
        .unwrap();

    let Related::One(Some(matched)) = parents[0].relation("profile").unwrap() else {
        panic!("expected one");
    };
    assert_eq!(matched.get("id"), Some(&Value::Int(100)));
}

#[test]
fn belongs_to_matches_on_the_owner_key() {
    let relation = Relation::belongs_to("users", "user_id", "id");
    let mut parents = vec![post(10, Value::Int(1)), post(11, Value::Int(2)), post(12, Value::Null)];
    let results = vec![user(1), user(2)];

    relation
        .match_models(&mut parents, results, "author")
        .unwrap();

    let Related::One(Some(author)) = parents[0].relation("author").unwrap() else {
        panic!("expected one");
    };
    assert_eq!(author.get("id"), Some(&Value::Int(1)));

    let Related::One(None) = parents[2].relation("author").unwrap() else {
        panic!("expected unmatched parent to get None");
    };
}

#[test]
fn belongs_to_many_joins_pivot_and_aliases_the_grouping_key() {
    let relation = Relation::belongs_to_many("tags", "post_tag", "post_id", "tag_id", "id", "id");
    let parents = vec![
        Model::from_row("posts", &Row::from_pairs([("id", Value::Int(1))])),
        Model::from_row("posts", &Row::from_pairs([("id", Value::Int(2))])),
    ];
    let query = relation.add_eager_constraints(&parents);
    let sql = MySqlGrammar::new().compile_select(&query).unwrap();
    assert_eq!(
        sql,
        "SELECT `tags`.*, `post_tag`.`post_id` AS `pivot_post_id` FROM `tags` \
         INNER JOIN `post_tag` ON `post_tag`.`tag_id` = `tags`.`id` \
         WHERE `post_tag`.`post_id` IN (?, ?)"
    );
}

#[test]
fn belongs_to_many_matching_groups_by_the_pivot_alias() {
    let relation = Relation::belongs_to_many("tags", "post_tag", "post_id", "tag_id", "id", "id");
    let mut parents = vec![
        Model::from_row("posts", &Row::from_pairs([("id", Value::Int(1))])),
        Model::from_row("posts", &Row::from_pairs([("id", Value::Int(2))])),
    ];
    // Joined rows carry the pivot alias; the same tag can appear under
    // two parents.
    let results = vec![
        Model::from_row(
            "tags",
            &Row::from_pairs([("id", Value::Int(7)), ("pivot_post_id", Value::Int(1))]),
        ),
        Model::from_row(
            "tags",
            &Row::from_pairs([("id", Value::Int(7)), ("pivot_post_id", Value::Int(2))]),
        ),
        Model::from_row(
            "tags",
            &Row::from_pairs([("id", Value::Int(8)), ("pivot_post_id", Value::Int(1))]),
        ),
    ];

    relation.match_models(&mut parents, results, "tags").unwrap();

    let Related::Many(first) = parents[0].relation("tags").unwrap() else {
        panic!("expected many");
    };
    assert_eq!(first.len(), 2);
    let Related::Many(second) = parents[1].relation("tags").unwrap() else {
        panic!("expected many");
    };
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].get("id"), Some(&Value::Int(7)));
}

#[test]
fn single_parent_constraints_filter_on_the_parent_key() {
    let relation = Relation::has_many("posts", "user_id", "id");
    let parent = user(42);
    let query = relation.add_constraints(&parent).unwrap();
    let sql = MySqlGrammar::new().compile_select(&query).unwrap();
    assert_eq!(sql, "SELECT * FROM `posts` WHERE `user_id` = ?");
    assert_eq!(query.bindings(), vec![Value::Int(42)]);
}

#[test]
fn single_parent_constraints_require_the_key() {
    let relation = Relation::has_many("posts", "user_id", "id");
    let parent = Model::new("users");
    assert!(relation.add_constraints(&parent).is_err());
}
