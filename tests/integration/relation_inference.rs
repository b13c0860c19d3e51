//! Integration tests for relation inference over a JSON snapshot

use super::test_utils::{fk, table};
use schemaforge::generation::build_model_inputs;
use schemaforge::relation::{build_relation_map, table_map, RelationKind};
use schemaforge::resource::Resource;
use schemaforge::types::TableKey;

const SNAPSHOT: &str = r#"{
  "tables": [
    {
      "schema": "public",
      "name": "post_tags",
      "columns": [
        {"name": "post_id", "format": "int8"},
        {"name": "tag_id", "format": "int8"}
      ],
      "primary_keys": ["post_id", "tag_id"],
      "relationships": [
        {
          "constraint_name": "post_tags_post_id_fkey",
          "source_table_schema": "public", "source_table_name": "post_tags", "source_column_name": "post_id",
          "target_table_schema": "public", "target_table_name": "posts", "target_column_name": "id"
        },
        {
          "constraint_name": "post_tags_tag_id_fkey",
          "source_table_schema": "public", "source_table_name": "post_tags", "source_column_name": "tag_id",
          "target_table_schema": "public", "target_table_name": "tags", "target_column_name": "id"
        }
      ]
    },
    {"schema": "public", "name": "posts", "primary_keys": ["id"]},
    {"schema": "public", "name": "tags", "primary_keys": ["id"]}
  ],
  "policies": [
    {"name": "read tags", "schema": "public", "table": "tags", "command": "SELECT", "roles": ["anon"]}
  ]
}"#;

#[test]
fn test_pivot_snapshot_yields_mirrored_many_to_many() {
    let resource = Resource::from_json(SNAPSHOT).unwrap();
    let relations = build_relation_map(&table_map(&resource.tables));

    // posts and tags carry no relationships themselves
    assert_eq!(relations.len(), 3);

    let posts = &relations[&TableKey::new("public", "posts")];
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].kind, RelationKind::ManyToMany);
    assert_eq!(posts[0].table, "tags");
    assert_eq!(posts[0].type_ref, "Vec<Tags>");
    let join = posts[0].join.as_ref().unwrap();
    assert_eq!(join.through, "post_tags");
    assert_eq!(join.source_primary_key, "id");
    assert_eq!(join.join_source_foreign_key, "post_id");
    assert_eq!(join.target_primary_key, "id");
    assert_eq!(join.join_target_foreign_key, "tag_id");

    let tags = &relations[&TableKey::new("public", "tags")];
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].table, "posts");
    assert_eq!(
        tags[0].join.as_ref().unwrap().join_source_foreign_key,
        "tag_id"
    );

    let pivot = &relations[&TableKey::new("public", "post_tags")];
    let kinds: Vec<_> = pivot.iter().map(|r| (r.kind, r.table.as_str())).collect();
    assert_eq!(
        kinds,
        vec![
            (RelationKind::HasOne, "posts"),
            (RelationKind::HasOne, "tags")
        ]
    );
}

#[test]
fn test_model_inputs_carry_policies_and_relations() {
    let resource = Resource::from_json(SNAPSHOT).unwrap();
    let inputs = build_model_inputs(&resource.tables, &resource.policies);

    let names: Vec<_> = inputs.iter().map(|i| i.table.name.as_str()).collect();
    assert_eq!(names, vec!["post_tags", "posts", "tags"]);

    let tags = inputs.iter().find(|i| i.table.name == "tags").unwrap();
    assert_eq!(tags.policies.len(), 1);
    assert_eq!(tags.policies[0].name, "read tags");
    assert_eq!(tags.relations.len(), 1);

    let posts = inputs.iter().find(|i| i.table.name == "posts").unwrap();
    assert!(posts.policies.is_empty());
}

#[test]
fn test_table_is_both_pivot_and_has_many_target() {
    // memberships pivots users/teams and is itself referenced by audit_log
    let tables = vec![
        table(
            "memberships",
            vec![
                fk("memberships", "user_id", "users", "id"),
                fk("memberships", "team_id", "teams", "id"),
                fk("audit_log", "membership_id", "memberships", "id"),
            ],
        ),
        table("users", vec![]),
        table("teams", vec![]),
    ];
    let relations = build_relation_map(&table_map(&tables));

    let memberships = &relations[&TableKey::new("public", "memberships")];
    let kinds: Vec<_> = memberships.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RelationKind::HasOne,
            RelationKind::HasOne,
            RelationKind::HasMany
        ]
    );
    assert_eq!(memberships[2].table, "audit_log");

    assert_eq!(relations[&TableKey::new("public", "users")][0].table, "teams");
    assert_eq!(relations[&TableKey::new("public", "teams")][0].table, "users");
}

#[test]
fn test_malformed_snapshot_is_rejected() {
    assert!(Resource::from_json("{\"tables\": [{\"schema\": \"public\"}]}").is_err());
    assert!(Resource::from_json("{\"roles\": [{\"name\": \"\"}]}").is_err());
}
