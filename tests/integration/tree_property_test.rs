//! Randomized move sequences keep the tree acyclic.

use std::collections::{HashMap, HashSet};

use http::StatusCode;
use rand::RngExt;
use serde_json::json;

use crate::helpers::{TestApp, owner};

/// Whether `target` is `node` or lies below it, following `parents`.
fn is_within(parents: &HashMap<i64, Option<i64>>, target: i64, node: i64) -> bool {
    let mut current = Some(target);
    let mut seen = HashSet::new();
    while let Some(id) = current {
        if id == node {
            return true;
        }
        assert!(seen.insert(id), "cycle through {id}");
        current = parents[&id];
    }
    false
}

#[tokio::test]
async fn test_random_moves_keep_tree_acyclic() {
    let app = TestApp::new().await;
    let mut rng = rand::rng();
    let mut parents: HashMap<i64, Option<i64>> = HashMap::new();
    let mut folders = Vec::new();

    for i in 0..12 {
        let parent = if folders.is_empty() || rng.random_range(0..3) == 0 {
            None
        } else {
            Some(folders[rng.random_range(0..folders.len())])
        };
        let id = app.create_folder(owner(), parent, &format!("f{i}")).await;
        parents.insert(id, parent);
        folders.push(id);
    }

    for _ in 0..60 {
        let node = folders[rng.random_range(0..folders.len())];
        let target = if rng.random_range(0..6) == 0 {
            None
        } else {
            Some(folders[rng.random_range(0..folders.len())])
        };

        let response = app
            .request(
                "PUT",
                &format!("/api/nodes/{node}/move"),
                Some(json!({ "parent_id": target })),
                Some(owner()),
            )
            .await;

        match target {
            Some(t) if t == node => assert_eq!(response.error(), "INVALID_TARGET"),
            Some(t) if is_within(&parents, t, node) => {
                assert_eq!(response.status, StatusCode::CONFLICT);
                assert_eq!(response.error(), "CYCLIC_MOVE");
            }
            _ => {
                assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
                parents.insert(node, target);
            }
        }
    }

    for &id in &folders {
        let response = app
            .request("GET", &format!("/api/nodes/{id}"), None, Some(owner()))
            .await;
        assert_eq!(response.body["data"]["parent_id"].as_i64(), parents[&id]);
        // Terminates without a repeated id.
        is_within(&parents, id, -1);
    }
}
