//! Bone hierarchy for skeletal models
//!
//! The tree is an arena of [`BoneNode`]s addressed by [`NodeId`]. Every node
//! knows its parent and its children, so the tree can be walked downwards
//! for pose propagation and upwards for ancestor queries. One tree exists
//! per imported model and is shared read-only by every instance of it.

use glam::Mat4;
use std::collections::HashMap;
use std::ops::Index;

use crate::error::{AnimError, Result};

/// Stable index of a node inside its [`BoneTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Arena slot of this node
    pub fn index(self) -> usize {
        self.0
    }
}

/// Import-time data attached to a node
#[derive(Debug, Clone, PartialEq)]
pub struct BoneData {
    /// Slot in the model's skinning palette, `None` for structural nodes
    pub bone_id: Option<usize>,
    /// Inverse bind-pose transform (model space to bone space)
    pub offset_matrix: Mat4,
    /// Rest-pose transform relative to the parent
    pub local_transform: Mat4,
}

impl BoneData {
    /// A pivot or grouping node that does not deform vertices
    pub fn structural(local_transform: Mat4) -> Self {
        Self {
            bone_id: None,
            offset_matrix: Mat4::IDENTITY,
            local_transform,
        }
    }

    /// A deforming bone writing into palette slot `bone_id`
    pub fn bone(bone_id: usize, local_transform: Mat4, offset_matrix: Mat4) -> Self {
        Self {
            bone_id: Some(bone_id),
            offset_matrix,
            local_transform,
        }
    }

    /// Build from an importer's signed id where `-1` marks a structural node
    pub fn from_raw_id(raw_id: i32, local_transform: Mat4, offset_matrix: Mat4) -> Self {
        Self {
            bone_id: usize::try_from(raw_id).ok(),
            offset_matrix,
            local_transform,
        }
    }
}

/// One joint of the skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct BoneNode {
    name: String,
    data: BoneData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl BoneNode {
    /// Unique name of the node within its tree
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Palette slot, `None` for structural nodes
    pub fn bone_id(&self) -> Option<usize> {
        self.data.bone_id
    }

    /// Whether this node writes a skinning matrix
    pub fn is_bone(&self) -> bool {
        self.data.bone_id.is_some()
    }

    /// Inverse bind-pose transform
    pub fn offset_matrix(&self) -> Mat4 {
        self.data.offset_matrix
    }

    /// Rest-pose local transform
    pub fn local_transform(&self) -> Mat4 {
        self.data.local_transform
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children of this node
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Rooted, name-keyed bone hierarchy
#[derive(Debug, Clone, Default)]
pub struct BoneTree {
    nodes: Vec<BoneNode>,
    root: Option<NodeId>,
    by_name: HashMap<String, NodeId>,
}

impl BoneTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the root node. A tree has exactly one root.
    pub fn add_root_node(&mut self, name: impl Into<String>, data: BoneData) -> Result<NodeId> {
        if let Some(root) = self.root {
            return Err(AnimError::RootAlreadySet(self.nodes[root.0].name.clone()));
        }
        let id = self.push_node(name.into(), data, None)?;
        self.root = Some(id);
        Ok(id)
    }

    /// Append a child under `parent`
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        data: BoneData,
    ) -> Result<NodeId> {
        if parent.0 >= self.nodes.len() {
            return Err(AnimError::IndexOutOfRange {
                what: "node",
                index: parent.0,
                len: self.nodes.len(),
            });
        }
        let id = self.push_node(name.into(), data, Some(parent))?;
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    fn push_node(&mut self, name: String, data: BoneData, parent: Option<NodeId>) -> Result<NodeId> {
        if self.by_name.contains_key(&name) {
            return Err(AnimError::DuplicateBoneName(name));
        }
        let id = NodeId(self.nodes.len());
        self.by_name.insert(name.clone(), id);
        self.nodes.push(BoneNode {
            name,
            data,
            parent,
            children: Vec::new(),
        });
        Ok(id)
    }

    /// Look a node up by name.
    ///
    /// Names are unique, so the result is the node a depth-first search from
    /// the root would reach first. Returns `None` for an empty tree or an
    /// unknown name.
    pub fn find_node_by(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Like [`find_node_by`](Self::find_node_by) but treats a miss as an error
    pub fn require_node(&self, name: &str) -> Result<NodeId> {
        self.find_node_by(name)
            .ok_or_else(|| AnimError::BoneNotFound(name.to_string()))
    }

    /// Root node, if one was added
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Node at `id`
    pub fn get(&self, id: NodeId) -> Option<&BoneNode> {
        self.nodes.get(id.0)
    }

    /// Parent of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(BoneNode::parent)
    }

    /// Children of `id`; empty for unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(BoneNode::children).unwrap_or_default()
    }

    /// Direct child of `id` named `name`
    pub fn child_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name == name)
    }

    /// Walk from `id` up to the root, starting with `id` itself
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), move |current| {
            self.parent(*current)
        })
    }

    /// Pre-order depth-first traversal from the root.
    ///
    /// Every node is yielded after its parent, which is the ordering pose
    /// propagation depends on.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }

    /// Number of nodes, structural ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Palette slots needed by this skeleton: highest bone id plus one
    pub fn bone_count(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(BoneNode::bone_id)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// All nodes in arena order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &BoneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }
}

impl Index<NodeId> for BoneTree {
    type Output = BoneNode;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

/// Pre-order iterator returned by [`BoneTree::depth_first`]
pub struct DepthFirst<'a> {
    tree: &'a BoneTree,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Reverse so children come out in insertion order
        self.stack
            .extend(self.tree.nodes[id.0].children.iter().rev().copied());
        Some(id)
    }
}
