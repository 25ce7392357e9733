//! Dependency and grouping adjacency.
//!
//! Built from a flat task list and never mutated afterwards; a changed task
//! list means a new graph. Holds:
//!
//! - `downstream[parent]` → children that depend on it (with link type)
//! - `upstream[child]` → parents it depends on (with link type)
//! - `children[group]` → direct members, `parent_of[member]` → group
//!
//! Dependencies whose target is not in the list are dropped at build time,
//! so they contribute no constraint anywhere downstream of this module.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.2 (BFS)

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::trace;

use crate::models::{DependencyType, Task};

/// One adjacency entry: the task on the other end and the link type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub task_id: String,
    pub dependency_type: DependencyType,
}

/// Adjacency over dependencies and group membership.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    ids: HashSet<String>,
    groups: HashSet<String>,
    downstream: HashMap<String, Vec<Link>>,
    upstream: HashMap<String, Vec<Link>>,
    children: HashMap<String, Vec<String>>,
    parent_of: HashMap<String, String>,
}

impl DependencyGraph {
    /// Builds the graph from a task list.
    pub fn build(tasks: &[Task]) -> Self {
        let mut graph = Self::default();
        for task in tasks {
            graph.ids.insert(task.id.clone());
            if task.is_group {
                graph.groups.insert(task.id.clone());
            }
        }

        for child in tasks {
            for dep in &child.dependencies {
                if !graph.ids.contains(&dep.target_id) {
                    trace!(
                        task = %child.id,
                        target = %dep.target_id,
                        "ignoring dependency on unknown task"
                    );
                    continue;
                }
                graph
                    .downstream
                    .entry(dep.target_id.clone())
                    .or_default()
                    .push(Link {
                        task_id: child.id.clone(),
                        dependency_type: dep.dependency_type,
                    });
                graph.upstream.entry(child.id.clone()).or_default().push(Link {
                    task_id: dep.target_id.clone(),
                    dependency_type: dep.dependency_type,
                });
            }

            if let Some(parent) = &child.parent_id {
                if parent != &child.id && graph.ids.contains(parent) {
                    graph
                        .children
                        .entry(parent.clone())
                        .or_default()
                        .push(child.id.clone());
                    graph.parent_of.insert(child.id.clone(), parent.clone());
                }
            }
        }

        graph
    }

    /// Whether the task is in the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Whether the task is a group.
    pub fn is_group(&self, id: &str) -> bool {
        self.groups.contains(id)
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the graph has no tasks.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Children depending on `id`, one entry per dependency.
    pub fn downstream(&self, id: &str) -> &[Link] {
        self.downstream.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parents `id` depends on, in declaration order.
    pub fn upstream(&self, id: &str) -> &[Link] {
        self.upstream.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct children depending on `id`, in first-seen order.
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.downstream(id)
            .iter()
            .map(|link| link.task_id.as_str())
            .filter(|child| seen.insert(*child))
            .collect()
    }

    /// Direct members of a group.
    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The group `id` belongs to.
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parent_of.get(id).map(String::as_str)
    }

    /// `id` plus every task that transitively depends on it.
    pub fn collect_downstream(&self, id: &str) -> BTreeSet<String> {
        self.reach(id, |cur| self.downstream(cur).iter().map(|l| l.task_id.as_str()))
    }

    /// `id` plus every task it transitively depends on.
    pub fn collect_upstream(&self, id: &str) -> BTreeSet<String> {
        self.reach(id, |cur| self.upstream(cur).iter().map(|l| l.task_id.as_str()))
    }

    /// `id` plus all of its descendants through nested groups.
    pub fn subtree(&self, id: &str) -> BTreeSet<String> {
        self.reach(id, |cur| self.children(cur).iter().map(String::as_str))
    }

    /// All descendants of `id` (excluding `id`), breadth-first.
    pub fn descendants(&self, id: &str) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);
        let mut order = Vec::new();
        let mut queue: VecDeque<&str> = self.children(id).iter().map(String::as_str).collect();
        while let Some(cur) = queue.pop_front() {
            if !seen.insert(cur) {
                continue;
            }
            order.push(cur);
            queue.extend(self.children(cur).iter().map(String::as_str));
        }
        order
    }

    /// Group chain above `id`, nearest first.
    ///
    /// Stops at the first repeated ID, so a grouping cycle cannot loop.
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);
        let mut cur = id;
        while let Some(parent) = self.parent(cur) {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            cur = parent;
        }
        chain
    }

    /// Tasks whose instants may change as a side effect of editing `id`.
    ///
    /// Starts from the transitive dependents and dependencies of `id` plus
    /// `id` itself, then grows until closed: every group reached brings in
    /// its subtree and every member brings in the group above it, and every
    /// task added this way brings in its own dependents and dependencies.
    /// A group whose derived span moves, or a member carried along with its
    /// group, then only ever touches tasks already in the set. The result
    /// is the connected component of `id` over dependency and membership
    /// links. Unknown IDs yield an empty set.
    pub fn affected_closure(&self, id: &str) -> BTreeSet<String> {
        self.reach(id, |cur| {
            self.downstream(cur)
                .iter()
                .chain(self.upstream(cur))
                .map(|link| link.task_id.as_str())
                .chain(self.children(cur).iter().map(String::as_str))
                .chain(self.parent(cur))
        })
    }

    fn reach<'a, F, I>(&'a self, start: &str, neighbours: F) -> BTreeSet<String>
    where
        F: Fn(&'a str) -> I,
        I: Iterator<Item = &'a str>,
    {
        let mut visited: HashSet<&'a str> = HashSet::new();
        let Some(start) = self.ids.get(start) else {
            return BTreeSet::new();
        };
        let mut queue: VecDeque<&'a str> = VecDeque::from([start.as_str()]);
        while let Some(cur) = queue.pop_front() {
            if !visited.insert(cur) {
                continue;
            }
            queue.extend(neighbours(cur).filter(|next| !visited.contains(next)));
        }
        visited.into_iter().map(str::to_string).collect()
    }
}
