//! Weak, name-based references into the scene graph.
//!
//! A path is re-resolved against current names every time it is used, so
//! renaming or reparenting any object along the chain breaks the reference.

use crate::scene_graph::{SceneGraph, SceneObjectId};

/// Finds the object at an absolute path such as `/Environment/Sun`.
/// Paths that are empty or not rooted with `/` resolve to nothing.
pub fn resolve_path(graph: &dyn SceneGraph, path: &str) -> Option<SceneObjectId> {
    let relative = path.strip_prefix('/')?;
    if relative.is_empty() {
        return None;
    }
    let segments: Vec<&str> = relative.split('/').collect();
    graph.roots().into_iter().find_map(|root| descend(graph, root, &segments))
}

fn descend(graph: &dyn SceneGraph, id: SceneObjectId, segments: &[&str]) -> Option<SceneObjectId> {
    let (head, rest) = segments.split_first()?;
    if graph.name(id) != Some(*head) {
        return None;
    }
    if rest.is_empty() {
        return Some(id);
    }
    graph.children(id).into_iter().find_map(|child| descend(graph, child, rest))
}

/// Absolute path of `object`, joined root to leaf.
pub fn object_path(graph: &dyn SceneGraph, object: Option<SceneObjectId>) -> Option<String> {
    let mut cursor = object?;
    let mut parts = vec![graph.name(cursor)?.to_string()];
    while let Some(parent) = graph.parent(cursor) {
        parts.push(graph.name(parent)?.to_string());
        cursor = parent;
    }
    parts.reverse();
    Some(format!("/{}", parts.join("/")))
}

/// Resolves a sun path, keeping the object only if it carries a light.
pub fn resolve_sun(graph: &dyn SceneGraph, path: &str) -> Option<SceneObjectId> {
    resolve_path(graph, path).filter(|id| graph.has_light(*id))
}
