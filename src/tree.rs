//! Category forest assembly for the parent picker.
//!
//! Rows reference their parent by id only. The `children` index is rebuilt
//! on every read from a `parent_id -> rows` grouping, so nothing persisted
//! ever owns its children.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::db::models::Category;

/// Prefix repeated once per depth level in picker labels.
pub const DEPTH_MARKER: &str = "— ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub children: Vec<CategoryNode>,
}

/// One entry of the flattened, depth-indented picker list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentOption {
    pub id: i32,
    pub label: String,
    pub depth: usize,
}

fn group_by_parent(categories: &[Category]) -> HashMap<i32, Vec<&Category>> {
    let mut children: HashMap<i32, Vec<&Category>> = HashMap::new();
    for category in categories {
        if let Some(parent_id) = category.parent_id {
            children.entry(parent_id).or_default().push(category);
        }
    }
    children
}

fn attach(category: &Category, children: &HashMap<i32, Vec<&Category>>) -> CategoryNode {
    let nested = children
        .get(&category.id)
        .map(|rows| rows.iter().map(|child| attach(child, children)).collect())
        .unwrap_or_default();

    CategoryNode {
        id: category.id,
        name: category.name.clone(),
        slug: category.slug.clone(),
        parent_id: category.parent_id,
        is_active: category.is_active,
        children: nested,
    }
}

/// Builds the forest of root categories, children attached recursively.
///
/// Sibling order follows input order. A row whose parent is missing from the
/// input is promoted to a root. Rows caught in a parent cycle are unreachable
/// from any root and are left out.
pub fn build_forest(categories: &[Category]) -> Vec<CategoryNode> {
    let ids: HashSet<i32> = categories.iter().map(|c| c.id).collect();
    let children = group_by_parent(categories);

    let forest: Vec<CategoryNode> = categories
        .iter()
        .filter(|c| c.parent_id.map_or(true, |parent| !ids.contains(&parent)))
        .map(|root| attach(root, &children))
        .collect();

    let placed = count_nodes(&forest);
    if placed != categories.len() {
        log::warn!(
            "{} categories are part of a parent cycle and were left out of the tree",
            categories.len() - placed
        );
    }
    forest
}

pub fn count_nodes(forest: &[CategoryNode]) -> usize {
    forest
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

/// Ids of every descendant of `id` (not including `id` itself).
pub fn descendant_ids(categories: &[Category], id: i32) -> HashSet<i32> {
    let children = group_by_parent(categories);
    let mut found = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        for child in children.get(&current).into_iter().flatten() {
            if child.id != id && found.insert(child.id) {
                stack.push(child.id);
            }
        }
    }
    found
}

/// Depth-first flattening for a single-select control. `exclude` drops a
/// node together with its subtree (a category cannot move beneath itself).
pub fn flatten_options(forest: &[CategoryNode], exclude: Option<i32>) -> Vec<ParentOption> {
    fn walk(nodes: &[CategoryNode], depth: usize, exclude: Option<i32>, out: &mut Vec<ParentOption>) {
        for node in nodes {
            if Some(node.id) == exclude {
                continue;
            }
            out.push(ParentOption {
                id: node.id,
                label: format!("{}{}", DEPTH_MARKER.repeat(depth), node.name),
                depth,
            });
            walk(&node.children, depth + 1, exclude, out);
        }
    }

    let mut options = Vec::new();
    walk(forest, 0, exclude, &mut options);
    options
}
