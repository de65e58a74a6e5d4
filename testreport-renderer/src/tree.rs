// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test tree model: per-root results aggregated into a single tree indexed by [`TestPath`].
//!
//! Every ancestor of a recorded path exists as a node, even if no root recorded a result at that
//! path. Nodes are created parent-first in the order their paths are first seen, which is also
//! the order children are listed in.
//!
//! # Aggregation
//!
//! Leaf counts are always derived from the tree. Within one root, a node without children is a
//! leaf and counts itself; a node with children has exactly the sum of its children's counts.
//! Ancestors that have no record of their own in a root get a synthesized summary whose result is
//! derived from their children and whose duration is the sum of their children's durations.

use crate::errors::TreeBuildError;
use indexmap::IndexMap;
use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};
use testreport_metadata::{
    OutputId, ResultType, SerializableFailure, SerializedMetadata, TestPath, TestResultRecord,
};
use tracing::debug;

/// Identifies a node within one [`TestTreeModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The identifier of the root node of every tree.
    pub const ROOT: NodeId = NodeId(0);
}

/// The result of one node as seen from one root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultSummary {
    /// The internal name.
    pub name: String,
    /// The name shown to users.
    pub display_name: String,
    /// The outcome.
    pub result_type: ResultType,
    /// The wall-clock duration.
    pub duration: Duration,
    /// Failures recorded for this node.
    pub failures: Vec<SerializableFailure>,
}

/// Summary and detail data for one tree node as seen from one root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerRootInfo {
    result: ResultSummary,
    total_leaf_count: usize,
    failed_leaf_count: usize,
    skipped_leaf_count: usize,
    output_id: Option<OutputId>,
    metadatas: Vec<SerializedMetadata>,
    child_count: usize,
    synthesized: bool,
}

impl PerRootInfo {
    /// Returns the result summary.
    pub fn result(&self) -> &ResultSummary {
        &self.result
    }

    /// Returns the number of leaf tests at or under this node.
    pub fn total_leaf_count(&self) -> usize {
        self.total_leaf_count
    }

    /// Returns the number of failed leaf tests at or under this node.
    pub fn failed_leaf_count(&self) -> usize {
        self.failed_leaf_count
    }

    /// Returns the number of skipped leaf tests at or under this node.
    pub fn skipped_leaf_count(&self) -> usize {
        self.skipped_leaf_count
    }

    /// Returns the handle to captured output, if any.
    pub fn output_id(&self) -> Option<OutputId> {
        self.output_id
    }

    /// Returns the metadata events, in logged order.
    pub fn metadatas(&self) -> &[SerializedMetadata] {
        &self.metadatas
    }

    /// Returns true if this node has children in this root.
    pub fn has_children(&self) -> bool {
        self.child_count > 0
    }

    /// Returns the number of children this node has in this root.
    pub fn child_count(&self) -> usize {
        self.child_count
    }

    /// Returns true if no result was recorded at this node for this root, and the summary was
    /// derived from its children instead.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }
}

/// One node of a [`TestTreeModel`].
#[derive(Clone, Debug)]
pub struct TestTreeNode {
    path: TestPath,
    per_root_info: IndexMap<String, PerRootInfo>,
    children: Vec<NodeId>,
}

impl TestTreeNode {
    /// Returns the path of this node.
    pub fn path(&self) -> &TestPath {
        &self.path
    }

    /// Returns the information for each root that has results at or under this node, in the
    /// order roots were added.
    pub fn per_root_info(&self) -> &IndexMap<String, PerRootInfo> {
        &self.per_root_info
    }

    /// Returns the ids of all children, in discovery order.
    pub fn child_ids(&self) -> &[NodeId] {
        &self.children
    }
}

/// Per-root test results aggregated into one tree.
///
/// The model is immutable once built.
#[derive(Clone, Debug)]
pub struct TestTreeModel {
    nodes: Vec<TestTreeNode>,
    by_path: HashMap<TestPath, NodeId>,
}

impl TestTreeModel {
    /// Returns a builder for a new model.
    pub fn builder() -> TestTreeModelBuilder {
        TestTreeModelBuilder::default()
    }

    /// Returns the root node.
    pub fn root(&self) -> &TestTreeNode {
        self.node(NodeId::ROOT)
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this model.
    pub fn node(&self, id: NodeId) -> &TestTreeNode {
        &self.nodes[id.0]
    }

    /// Looks up the id of the node at `path`.
    pub fn node_id(&self, path: &TestPath) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    /// Looks up the node at `path`.
    pub fn lookup(&self, path: &TestPath) -> Option<&TestTreeNode> {
        self.node_id(path).map(|id| self.node(id))
    }

    /// Returns the information for `root_name` at `path`, if any.
    pub fn per_root_info(&self, path: &TestPath, root_name: &str) -> Option<&PerRootInfo> {
        self.lookup(path)?.per_root_info.get(root_name)
    }

    /// Returns every node, parents before children.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = (NodeId, &TestTreeNode)> + '_ {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Returns the number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree only consists of a root without results.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.root().per_root_info.is_empty()
    }

    /// Returns the children of `id` that have results in `root_name`, in discovery order.
    ///
    /// The returned iterator is lazy and can be cloned to restart it.
    pub fn children_of<'a>(&'a self, id: NodeId, root_name: &'a str) -> ChildrenOf<'a> {
        ChildrenOf {
            model: self,
            children: self.node(id).children.iter(),
            root_name,
        }
    }
}

/// Iterator over the children of a node within one root. Returned by
/// [`TestTreeModel::children_of`].
#[derive(Clone, Debug)]
pub struct ChildrenOf<'a> {
    model: &'a TestTreeModel,
    children: std::slice::Iter<'a, NodeId>,
    root_name: &'a str,
}

impl<'a> Iterator for ChildrenOf<'a> {
    type Item = (NodeId, &'a TestTreeNode, &'a PerRootInfo);

    fn next(&mut self) -> Option<Self::Item> {
        for &id in self.children.by_ref() {
            let node = self.model.node(id);
            if let Some(info) = node.per_root_info.get(self.root_name) {
                return Some((id, node, info));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.children.len()))
    }
}

/// Builder for a [`TestTreeModel`].
#[derive(Clone, Debug, Default)]
pub struct TestTreeModelBuilder {
    roots: IndexMap<String, Vec<TestResultRecord>>,
}

impl TestTreeModelBuilder {
    /// Adds all records produced by one root.
    pub fn add_root(
        &mut self,
        root_name: impl Into<String>,
        records: impl IntoIterator<Item = TestResultRecord>,
    ) -> Result<&mut Self, TreeBuildError> {
        let root_name = root_name.into();
        if self.roots.contains_key(&root_name) {
            return Err(TreeBuildError::DuplicateRoot { root_name });
        }
        self.roots.insert(root_name, records.into_iter().collect());
        Ok(self)
    }

    /// Builds the model.
    pub fn build(self) -> Result<TestTreeModel, TreeBuildError> {
        let mut nodes = vec![TestTreeNode {
            path: TestPath::ROOT,
            per_root_info: IndexMap::new(),
            children: Vec::new(),
        }];
        let mut by_path = HashMap::from([(TestPath::ROOT, NodeId::ROOT)]);

        // First pass: create every node and index each root's records by node.
        let mut per_root = Vec::with_capacity(self.roots.len());
        for (root_name, records) in self.roots {
            let mut recorded = HashMap::new();
            let mut members = HashSet::new();
            for record in records {
                let id = ensure_node(&mut nodes, &mut by_path, &record.path);
                if recorded.contains_key(&id) {
                    return Err(TreeBuildError::DuplicateResult {
                        root_name,
                        path: record.path,
                    });
                }

                members.insert(id);
                for ancestor in record.path.ancestors() {
                    members.insert(by_path[&ancestor]);
                }
                recorded.insert(id, record);
            }
            per_root.push((root_name, recorded, members));
        }

        // Second pass: aggregate each root bottom-up. Children always have larger ids than their
        // parents, so walking ids in reverse visits children first.
        let root_count = per_root.len();
        for (root_name, mut recorded, members) in per_root {
            let mut infos: Vec<Option<PerRootInfo>> = vec![None; nodes.len()];
            for index in (0..nodes.len()).rev() {
                let id = NodeId(index);
                if !members.contains(&id) {
                    continue;
                }

                let child_infos: Vec<&PerRootInfo> = nodes[index]
                    .children
                    .iter()
                    .filter_map(|child| infos[child.0].as_ref())
                    .collect();
                let info = aggregate(
                    &root_name,
                    &nodes[index].path,
                    recorded.remove(&id),
                    &child_infos,
                );
                infos[index] = Some(info);
            }

            for (node, info) in nodes.iter_mut().zip(infos) {
                if let Some(info) = info {
                    node.per_root_info.insert(root_name.clone(), info);
                }
            }
        }

        debug!(
            nodes = nodes.len(),
            roots = root_count,
            "built test tree model"
        );

        Ok(TestTreeModel {
            nodes,
            by_path,
        })
    }
}

fn ensure_node(
    nodes: &mut Vec<TestTreeNode>,
    by_path: &mut HashMap<TestPath, NodeId>,
    path: &TestPath,
) -> NodeId {
    if let Some(&id) = by_path.get(path) {
        return id;
    }

    let parent = match path.parent() {
        Some(parent) => ensure_node(nodes, by_path, &parent),
        // Only the root has no parent, and it always exists.
        None => return NodeId::ROOT,
    };

    let id = NodeId(nodes.len());
    nodes.push(TestTreeNode {
        path: path.clone(),
        per_root_info: IndexMap::new(),
        children: Vec::new(),
    });
    nodes[parent.0].children.push(id);
    by_path.insert(path.clone(), id);
    id
}

fn aggregate(
    root_name: &str,
    path: &TestPath,
    record: Option<TestResultRecord>,
    children: &[&PerRootInfo],
) -> PerRootInfo {
    let (total, failed, skipped) = if children.is_empty() {
        // A member without children always has its own record.
        let result_type = record.as_ref().map(|r| r.result_type);
        (
            1,
            usize::from(result_type == Some(ResultType::Failure)),
            usize::from(result_type == Some(ResultType::Skipped)),
        )
    } else {
        children.iter().fold((0, 0, 0), |(t, f, s), child| {
            (
                t + child.total_leaf_count,
                f + child.failed_leaf_count,
                s + child.skipped_leaf_count,
            )
        })
    };

    match record {
        Some(record) => PerRootInfo {
            result: ResultSummary {
                duration: record.duration(),
                name: record.name,
                display_name: record.display_name,
                result_type: record.result_type,
                failures: record.failures,
            },
            total_leaf_count: total,
            failed_leaf_count: failed,
            skipped_leaf_count: skipped,
            output_id: record.output_id,
            metadatas: record.metadatas,
            child_count: children.len(),
            synthesized: false,
        },
        None => {
            let name = path.name().unwrap_or(root_name).to_owned();
            let result_type = if children
                .iter()
                .any(|c| c.result.result_type == ResultType::Failure)
            {
                ResultType::Failure
            } else if children
                .iter()
                .all(|c| c.result.result_type == ResultType::Skipped)
            {
                ResultType::Skipped
            } else {
                ResultType::Success
            };
            let duration = children
                .iter()
                .fold(Duration::ZERO, |acc, c| acc.saturating_add(c.result.duration));

            PerRootInfo {
                result: ResultSummary {
                    display_name: name.clone(),
                    name,
                    result_type,
                    duration,
                    failures: Vec::new(),
                },
                total_leaf_count: total,
                failed_leaf_count: failed,
                skipped_leaf_count: skipped,
                output_id: None,
                metadatas: Vec::new(),
                child_count: children.len(),
                synthesized: true,
            }
        }
    }
}
