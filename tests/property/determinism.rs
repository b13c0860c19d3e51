//! Property-based tests for relation inference guarantees

use proptest::prelude::*;
use schemaforge::relation::{build_relation_map, table_map, RelationKind};
use schemaforge::resource::{Relationship, Table};
use schemaforge::types::TableKey;
use std::collections::BTreeMap;

const NAMES: [&str; 5] = ["accounts", "orders", "items", "tags", "links"];

fn edge(source: usize, target: usize, column: usize) -> Relationship {
    Relationship {
        constraint_name: format!("fk_{}_{}_{}", source, target, column),
        source_schema: "public".to_string(),
        source_table: NAMES[source].to_string(),
        source_column: format!("{}_id_{}", NAMES[target], column),
        target_schema: "public".to_string(),
        target_table: NAMES[target].to_string(),
        target_column: "id".to_string(),
    }
}

/// Every edge is reported on both of its tables, like the remote schema does.
fn tables_from_edges(edges: &[(usize, usize, usize)]) -> Vec<Table> {
    let mut by_name: BTreeMap<usize, Vec<Relationship>> = BTreeMap::new();
    for &(source, target, column) in edges {
        by_name.entry(source).or_default().push(edge(source, target, column));
        if target != source {
            by_name.entry(target).or_default().push(edge(source, target, column));
        }
    }
    (0..NAMES.len())
        .map(|i| Table {
            schema: "public".to_string(),
            name: NAMES[i].to_string(),
            columns: vec![],
            primary_keys: vec!["id".to_string()],
            relationships: by_name.remove(&i).unwrap_or_default(),
        })
        .collect()
}

fn edges_strategy() -> impl Strategy<Value = Vec<(usize, usize, usize)>> {
    prop::collection::vec((0..NAMES.len(), 0..NAMES.len(), 0..3usize), 0..12)
}

proptest! {
    #[test]
    fn relation_map_is_deterministic(edges in edges_strategy()) {
        let tables = table_map(&tables_from_edges(&edges));
        prop_assert_eq!(build_relation_map(&tables), build_relation_map(&tables));
    }

    #[test]
    fn input_order_does_not_change_the_map(
        (edges, shuffled) in edges_strategy().prop_flat_map(|edges| {
            let tables = tables_from_edges(&edges);
            (Just(edges), Just(tables).prop_shuffle())
        })
    ) {
        let ordered = build_relation_map(&table_map(&tables_from_edges(&edges)));
        let shuffled = build_relation_map(&table_map(&shuffled));
        prop_assert_eq!(ordered, shuffled);
    }

    #[test]
    fn many_to_many_never_points_back_at_owner(edges in edges_strategy()) {
        let relations = build_relation_map(&table_map(&tables_from_edges(&edges)));
        for (owner, entries) in &relations {
            for relation in entries.iter().filter(|r| r.kind == RelationKind::ManyToMany) {
                prop_assert_ne!(&relation.target_key(), owner);
                prop_assert!(relation.join.is_some());
            }
        }
    }

    #[test]
    fn direct_relations_follow_edge_order(edges in edges_strategy()) {
        let tables = tables_from_edges(&edges);
        let relations = build_relation_map(&table_map(&tables));
        for table in tables.iter().filter(|t| !t.relationships.is_empty()) {
            // pivots processed earlier may already have added many-to-many entries
            let direct: Vec<_> = relations[&table.key()]
                .iter()
                .filter(|r| r.kind != RelationKind::ManyToMany)
                .collect();
            prop_assert_eq!(direct.len(), table.relationships.len());
            for (relation, edge) in direct.into_iter().zip(&table.relationships) {
                let expected = if edge.source_table == table.name {
                    RelationKind::HasOne
                } else {
                    RelationKind::HasMany
                };
                prop_assert_eq!(relation.kind, expected);
                prop_assert_eq!(&relation.foreign_key, &edge.source_column);
            }
        }
    }

    #[test]
    fn tables_without_edges_only_appear_as_pivot_targets(edges in edges_strategy()) {
        let tables = tables_from_edges(&edges);
        let relations = build_relation_map(&table_map(&tables));
        for table in tables.iter().filter(|t| t.relationships.is_empty()) {
            let key: TableKey = table.key();
            if let Some(entry) = relations.get(&key) {
                prop_assert!(entry.iter().all(|r| r.kind == RelationKind::ManyToMany));
            }
        }
    }
}
