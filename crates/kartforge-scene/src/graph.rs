//! Flattened scene graph
//!
//! Builds the forest the exporters query: one node per object occurrence,
//! with collection instances expanded in place. Nodes live in an arena and
//! refer to each other by index; parent and instance-root links are plain
//! back-references, never second owners.

use std::collections::VecDeque;

use glam::Mat4;

use kartforge_core::{Error, Result};

use crate::source::{ObjectId, Scene, SourceObject};

/// Index into [`SceneGraph::nodes`].
pub type NodeId = usize;

/// One flattened, uniquely named object occurrence.
#[derive(Debug)]
pub struct SceneNode {
    /// Root nodes have depth 0; every child is exactly one deeper.
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// The underlying source object.
    pub object: ObjectId,
    /// The ancestor whose collection instancing introduced this node,
    /// if any.
    pub instance_root: Option<NodeId>,
    /// Globally unique display name; instanced nodes are prefixed with
    /// their instance root's object name.
    pub unique_name: String,
    /// Resolved world transform (source space), instancing applied.
    pub world_matrix: Mat4,
}

/// The flattened forest over a scene document.
pub struct SceneGraph<'a> {
    scene: &'a Scene,
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl<'a> SceneGraph<'a> {
    /// Flatten the scene into a forest.
    ///
    /// Parentless, non-ignored objects become the roots. A node whose object
    /// instances a collection gets the collection's parentless members as
    /// children (with composed transforms); any other node gets the object's
    /// native children. Ignored objects never produce a node, so their whole
    /// subtree stays out.
    pub fn build(scene: &'a Scene) -> Result<Self> {
        let mut graph = SceneGraph {
            scene,
            nodes: Vec::new(),
            roots: Vec::new(),
        };

        for root_id in scene.roots() {
            let object = &scene.objects[root_id];
            if object.ignored {
                continue;
            }

            let node_id = graph.nodes.len();
            graph.nodes.push(SceneNode {
                depth: 0,
                parent: None,
                children: Vec::new(),
                object: root_id,
                instance_root: None,
                unique_name: object.name.clone(),
                world_matrix: object.world_transform,
            });
            graph.roots.push(node_id);
        }

        let mut worklist: Vec<NodeId> = graph.roots.clone();

        while let Some(node_id) = worklist.pop() {
            let object_id = graph.nodes[node_id].object;
            let parent_depth = graph.nodes[node_id].depth;
            let object = &scene.objects[object_id];

            let child_objects: Vec<ObjectId> = match object.instance_collection {
                Some(collection_id) => {
                    graph.check_instance_cycle(node_id, collection_id)?;
                    scene.collections[collection_id]
                        .objects
                        .iter()
                        .copied()
                        .filter(|&member| scene.objects[member].parent.is_none())
                        .collect()
                }
                None => scene.children_of(object_id).collect(),
            };

            for child_object_id in child_objects {
                let child_object = &scene.objects[child_object_id];
                if child_object.ignored {
                    continue;
                }

                let instance_root = if object.instance_collection.is_some() {
                    Some(node_id)
                } else {
                    graph.nodes[node_id].instance_root
                };

                let (unique_name, world_matrix) = match instance_root {
                    None => (child_object.name.clone(), child_object.world_transform),
                    Some(root_id) => {
                        let root = &graph.nodes[root_id];
                        let root_name = &scene.objects[root.object].name;
                        (
                            format!("{} -> {}", root_name, child_object.name),
                            root.world_matrix * child_object.world_transform,
                        )
                    }
                };

                let child_id = graph.nodes.len();
                graph.nodes.push(SceneNode {
                    depth: parent_depth + 1,
                    parent: Some(node_id),
                    children: Vec::new(),
                    object: child_object_id,
                    instance_root,
                    unique_name,
                    world_matrix,
                });
                graph.nodes[node_id].children.push(child_id);
                worklist.push(child_id);
            }
        }

        Ok(graph)
    }

    /// A collection reachable from its own instancing chain would expand
    /// forever; refuse it up front.
    fn check_instance_cycle(&self, node_id: NodeId, collection_id: usize) -> Result<()> {
        let mut ancestor = self.nodes[node_id].instance_root;

        while let Some(root_id) = ancestor {
            let root_object = &self.scene.objects[self.nodes[root_id].object];
            if root_object.instance_collection == Some(collection_id) {
                return Err(Error::InstanceCycle {
                    collection: self.scene.collections[collection_id].name.clone(),
                });
            }
            ancestor = self.nodes[root_id].instance_root;
        }

        Ok(())
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id]
    }

    /// The source object behind a node.
    pub fn object_of(&self, id: NodeId) -> &'a SourceObject {
        &self.scene.objects[self.nodes[id].object]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Breadth-first traversal of the whole forest.
    pub fn breadth_first(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut queue: VecDeque<NodeId> = self.roots.iter().copied().collect();

        std::iter::from_fn(move || {
            let id = queue.pop_front()?;
            queue.extend(self.nodes[id].children.iter().copied());
            Some(id)
        })
    }

    /// All nodes matching a predicate, in breadth-first order.
    pub fn search_many(
        &self,
        mut predicate: impl FnMut(&SceneNode, &SourceObject) -> bool,
    ) -> Vec<NodeId> {
        self.breadth_first()
            .filter(|&id| predicate(&self.nodes[id], self.object_of(id)))
            .collect()
    }

    /// The first node matching a predicate in breadth-first order.
    pub fn search_one(
        &self,
        mut predicate: impl FnMut(&SceneNode, &SourceObject) -> bool,
    ) -> Option<NodeId> {
        self.breadth_first()
            .find(|&id| predicate(&self.nodes[id], self.object_of(id)))
    }
}
