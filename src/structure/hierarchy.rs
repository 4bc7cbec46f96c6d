//! Numbering hierarchy reconciliation.
//!
//! Numbered headings form a tree through their prefixes (`2.3` is the parent
//! of `2.3.1`). Whatever typography suggested, a parent must end up at a
//! strictly smaller level number than each of its children.

use std::collections::HashMap;

use super::numbering::{numbering_prefix, parent_prefix};
use crate::model::{Heading, Level};

#[derive(Debug)]
struct Node {
    heading: usize,
    depth: usize,
    parent: Option<usize>,
}

/// Arena of numbered headings linked to their parent prefixes.
#[derive(Debug, Default)]
pub struct NumberingTree {
    nodes: Vec<Node>,
}

impl NumberingTree {
    /// Build the tree. When a prefix occurs more than once, the last
    /// occurrence is the parent of its children.
    pub fn build(headings: &[Heading]) -> Self {
        let prefixes: Vec<(usize, &str)> = headings
            .iter()
            .enumerate()
            .filter_map(|(i, h)| numbering_prefix(&h.text).map(|p| (i, p)))
            .collect();

        let mut node_of_prefix: HashMap<&str, usize> = HashMap::new();
        for (node, (_, prefix)) in prefixes.iter().enumerate() {
            node_of_prefix.insert(*prefix, node);
        }

        let nodes = prefixes
            .iter()
            .map(|&(heading, prefix)| {
                let parent = parent_prefix(prefix).and_then(|p| {
                    let found = node_of_prefix.get(p).copied();
                    if found.is_none() {
                        log::debug!("no parent heading {p:?} for {:?}", headings[heading].text);
                    }
                    found
                });
                Node {
                    heading,
                    depth: prefix.split('.').count(),
                    parent,
                }
            })
            .collect();

        Self { nodes }
    }

    /// Number of numbered headings in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the outline has no numbered headings.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Enforce `parent < child` and return how many levels changed.
    ///
    /// Deepest prefixes first, each parent is raised to one above its
    /// shallowest child (never above `H1`). Then, shallowest first, any child
    /// that is still not below its parent is pushed to `parent + 1`.
    pub fn reconcile(&self, headings: &mut [Heading]) -> usize {
        let before: Vec<Level> = headings.iter().map(|h| h.level).collect();

        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by(|&a, &b| self.nodes[b].depth.cmp(&self.nodes[a].depth));

        for &node in &order {
            let Some(parent) = self.nodes[node].parent else {
                continue;
            };
            let child_level = headings[self.nodes[node].heading].level;
            let parent_heading = &mut headings[self.nodes[parent].heading];
            if parent_heading.level >= child_level {
                parent_heading.level = child_level.raised();
            }
        }

        for &node in order.iter().rev() {
            let Some(parent) = self.nodes[node].parent else {
                continue;
            };
            let parent_level = headings[self.nodes[parent].heading].level;
            let child = &mut headings[self.nodes[node].heading];
            if child.level <= parent_level {
                child.level = parent_level.lowered();
            }
        }

        headings
            .iter()
            .zip(before)
            .filter(|(h, level)| h.level != *level)
            .count()
    }
}

/// Build the numbering tree and reconcile levels in place.
pub fn reconcile_hierarchy(headings: &mut [Heading]) -> usize {
    let tree = NumberingTree::build(headings);
    let changed = tree.reconcile(headings);
    if changed > 0 {
        log::debug!("reconciled {changed} heading level(s) over {} numbered headings", tree.len());
    }
    changed
}
