use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneObjectId(pub usize);

/// Read access to the host's object hierarchy. Sibling order is significant:
/// lookups take the first match.
pub trait SceneGraph {
    fn roots(&self) -> Vec<SceneObjectId>;
    fn children(&self, id: SceneObjectId) -> Vec<SceneObjectId>;
    fn parent(&self, id: SceneObjectId) -> Option<SceneObjectId>;
    fn name(&self, id: SceneObjectId) -> Option<&str>;
    fn has_light(&self, id: SceneObjectId) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    #[serde(default)]
    pub light: bool,
}

/// Flat hierarchy where each node refers to its parent by index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneTree {
    #[serde(default)]
    nodes: Vec<SceneNode>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: SceneObjectId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn spawn(&mut self, name: impl Into<String>, parent: Option<SceneObjectId>) -> Result<SceneObjectId> {
        if let Some(parent) = parent {
            if !self.contains(parent) {
                bail!("parent object {} does not exist", parent.0);
            }
        }
        self.nodes.push(SceneNode { name: name.into(), parent: parent.map(|p| p.0), light: false });
        Ok(SceneObjectId(self.nodes.len() - 1))
    }

    pub fn spawn_light(&mut self, name: impl Into<String>, parent: Option<SceneObjectId>) -> Result<SceneObjectId> {
        let id = self.spawn(name, parent)?;
        self.nodes[id.0].light = true;
        Ok(id)
    }

    pub fn rename(&mut self, id: SceneObjectId, name: impl Into<String>) -> Result<()> {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.name = name.into();
                Ok(())
            }
            None => bail!("object {} does not exist", id.0),
        }
    }

    pub fn reparent(&mut self, id: SceneObjectId, parent: Option<SceneObjectId>) -> Result<()> {
        if !self.contains(id) {
            bail!("object {} does not exist", id.0);
        }
        if let Some(new_parent) = parent {
            if !self.contains(new_parent) {
                bail!("parent object {} does not exist", new_parent.0);
            }
            let mut cursor = Some(new_parent);
            while let Some(current) = cursor {
                if current == id {
                    bail!("cannot parent object {} under its own descendant", id.0);
                }
                cursor = SceneGraph::parent(self, current);
            }
        }
        self.nodes[id.0].parent = parent.map(|p| p.0);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent >= self.nodes.len() {
                    bail!("object '{}' has parent index {} outside object list", node.name, parent);
                }
            }
            let mut steps = 0;
            let mut cursor = node.parent;
            while let Some(current) = cursor {
                steps += 1;
                if current == index || steps > self.nodes.len() {
                    bail!("object '{}' is part of a parent cycle", node.name);
                }
                cursor = self.nodes.get(current).and_then(|n| n.parent);
            }
        }
        Ok(())
    }
}

impl SceneGraph for SceneTree {
    fn roots(&self) -> Vec<SceneObjectId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| SceneObjectId(index))
            .collect()
    }

    fn children(&self, id: SceneObjectId) -> Vec<SceneObjectId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent == Some(id.0))
            .map(|(index, _)| SceneObjectId(index))
            .collect()
    }

    fn parent(&self, id: SceneObjectId) -> Option<SceneObjectId> {
        self.nodes.get(id.0).and_then(|node| node.parent).map(SceneObjectId)
    }

    fn name(&self, id: SceneObjectId) -> Option<&str> {
        self.nodes.get(id.0).map(|node| node.name.as_str())
    }

    fn has_light(&self, id: SceneObjectId) -> bool {
        self.nodes.get(id.0).is_some_and(|node| node.light)
    }
}
