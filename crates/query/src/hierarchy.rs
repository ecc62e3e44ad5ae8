use crate::config::HierarchyConfig;
use atlas_fact_store::FactStore;
use atlas_protocol::{FactFilter, NodeId, Predicate, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Callers,
    Callees,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CallTreeNode {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub depth: usize,
    /// Children were truncated at the configured threshold.
    pub pruned: bool,
    /// This node was already expanded elsewhere in the tree and is
    /// returned as a leaf to keep cyclic graphs finite.
    pub revisited: bool,
    pub children: Vec<CallTreeNode>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CallHierarchy {
    pub root: CallTreeNode,
    pub direction: Direction,
    pub total_nodes: usize,
    /// Deepest level actually reached, independent of the configured cap.
    pub max_depth_reached: usize,
}

struct Slot {
    id: String,
    depth: usize,
    pruned: bool,
    revisited: bool,
    children: Vec<usize>,
}

impl Slot {
    fn new(id: String, depth: usize) -> Self {
        Self {
            id,
            depth,
            pruned: false,
            revisited: false,
            children: Vec::new(),
        }
    }
}

/// Expand the call graph from `entity_id` as an explicit worklist.
///
/// A node is marked visited before expansion; meeting it again yields a
/// leaf rather than re-expansion, so cycles terminate. The same node can
/// still appear once per branch of the tree.
pub async fn build_call_hierarchy<S: FactStore + ?Sized>(
    store: &S,
    entity_id: &str,
    direction: Direction,
    max_depth: usize,
    config: &HierarchyConfig,
) -> Result<CallHierarchy> {
    let mut slots = vec![Slot::new(entity_id.to_string(), 0)];
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<usize> = VecDeque::from([0]);

    while let Some(slot_idx) = queue.pop_front() {
        let (id, depth) = {
            let slot = &slots[slot_idx];
            (slot.id.clone(), slot.depth)
        };

        if !visited.insert(id.clone()) {
            slots[slot_idx].revisited = true;
            continue;
        }
        if depth >= max_depth {
            continue;
        }

        let filter = match direction {
            Direction::Callers => FactFilter::object(&id).with_predicate(Predicate::Calls),
            Direction::Callees => FactFilter::subject(&id).with_predicate(Predicate::Calls),
        };
        let facts = store.find(&filter).await?;

        let mut seen_children = HashSet::new();
        let mut neighbors: Vec<String> = Vec::new();
        for fact in facts {
            let neighbor = match direction {
                Direction::Callers => fact.subject,
                Direction::Callees => fact.object,
            };
            if seen_children.insert(neighbor.clone()) {
                neighbors.push(neighbor);
            }
        }

        if neighbors.len() > config.max_children {
            // First N in store order, not reweighted by importance.
            neighbors.truncate(config.max_children);
            slots[slot_idx].pruned = true;
        }

        for neighbor in neighbors {
            let child_idx = slots.len();
            slots.push(Slot::new(neighbor, depth + 1));
            slots[slot_idx].children.push(child_idx);
            queue.push_back(child_idx);
        }
    }

    let total_nodes = slots.len();
    let max_depth_reached = slots.iter().map(|slot| slot.depth).max().unwrap_or(0);

    // Children always carry a larger index than their parent, so one
    // reverse sweep assembles the tree without recursion.
    let mut nodes: Vec<Option<CallTreeNode>> = Vec::with_capacity(slots.len());
    nodes.resize_with(slots.len(), || None);
    for idx in (0..slots.len()).rev() {
        let slot = &slots[idx];
        let children = slot
            .children
            .iter()
            .map(|&child| nodes[child].take().expect("child assembled"))
            .collect();
        let (name, file) = describe(&slot.id);
        nodes[idx] = Some(CallTreeNode {
            id: slot.id.clone(),
            name,
            file,
            depth: slot.depth,
            pruned: slot.pruned,
            revisited: slot.revisited,
            children,
        });
    }

    Ok(CallHierarchy {
        root: nodes[0].take().expect("root assembled"),
        direction,
        total_nodes,
        max_depth_reached,
    })
}

fn describe(id: &str) -> (String, Option<String>) {
    match NodeId::parse(id) {
        Ok(node) => {
            let file = node.containing_file().map(str::to_string);
            (node.name, file)
        }
        Err(_) => (id.to_string(), None),
    }
}
