//! Project reference graph for multi-project builds

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{BuildError, BuildResult};

/// Projects keyed by configuration path, with an edge from each project to
/// every project it references.
#[derive(Debug, Default)]
pub struct BuildGraph {
    /// Configuration paths in discovery order
    nodes: Vec<PathBuf>,
    index: HashMap<PathBuf, usize>,
    /// `dependencies[i]`: indices node `i` depends on
    dependencies: Vec<Vec<usize>>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from `[project, reference]` pairs. Projects enter the
    /// discovery order the first time they are named.
    #[cfg(test)]
    fn from_edges<'a>(edges: impl IntoIterator<Item = (&'a Path, &'a Path)>) -> Self {
        let mut graph = Self::new();
        for (project, reference) in edges {
            graph.add_dependency(project, reference);
        }
        graph
    }

    /// Adds a project with no edges, if it is not in the graph yet.
    pub fn add_project(&mut self, path: &Path) -> usize {
        if let Some(&index) = self.index.get(path) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(path.to_path_buf());
        self.index.insert(path.to_path_buf(), index);
        self.dependencies.push(Vec::new());
        index
    }

    /// Records that `project` depends on `reference`.
    pub fn add_dependency(&mut self, project: &Path, reference: &Path) {
        let from = self.add_project(project);
        let to = self.add_project(reference);
        if !self.dependencies[from].contains(&to) {
            self.dependencies[from].push(to);
        }
    }

    /// A cycle as the path that closes it, e.g. `[a, b, a]`.
    fn find_cycle(&self) -> Option<Vec<PathBuf>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Active,
            Done,
        }

        fn visit(graph: &BuildGraph, node: usize, marks: &mut [Mark], stack: &mut Vec<usize>) -> Option<Vec<PathBuf>> {
            marks[node] = Mark::Active;
            stack.push(node);
            for &dependency in &graph.dependencies[node] {
                match marks[dependency] {
                    Mark::Active => {
                        let start = stack.iter().position(|&n| n == dependency).unwrap_or(0);
                        let mut cycle: Vec<PathBuf> = stack[start..].iter().map(|&n| graph.nodes[n].clone()).collect();
                        cycle.push(graph.nodes[dependency].clone());
                        return Some(cycle);
                    }
                    Mark::New => {
                        if let Some(cycle) = visit(graph, dependency, marks, stack) {
                            return Some(cycle);
                        }
                    }
                    Mark::Done => {}
                }
            }
            stack.pop();
            marks[node] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::New; self.nodes.len()];
        let mut stack = Vec::new();
        (0..self.nodes.len()).find_map(|node| {
            if marks[node] == Mark::New {
                visit(self, node, &mut marks, &mut stack)
            } else {
                None
            }
        })
    }

    /// Every project after the projects it references. Among projects that
    /// are ready at the same time, the one discovered first goes first.
    pub fn build_order(&self) -> BuildResult<Vec<PathBuf>> {
        // Kahn's algorithm over the reversed edges
        let mut remaining: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (node, dependencies) in self.dependencies.iter().enumerate() {
            for &dependency in dependencies {
                dependents[dependency].push(node);
            }
        }

        let mut ready: BTreeSet<usize> = (0..self.nodes.len()).filter(|&n| remaining[n] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = ready.pop_first() {
            order.push(self.nodes[node].clone());
            for &dependent in &dependents[node] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }
        if order.len() == self.nodes.len() {
            return Ok(order);
        }

        // whatever Kahn left over sits on or behind a cycle
        let cycle = self.find_cycle().unwrap_or_else(|| {
            (0..self.nodes.len())
                .filter(|&n| remaining[n] > 0)
                .map(|n| self.nodes[n].clone())
                .collect()
        });
        Err(BuildError::CircularReference(
            cycle.iter().map(|path| path.display().to_string()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(name: &str) -> PathBuf {
        PathBuf::from(name)
    }

    fn position(order: &[PathBuf], name: &str) -> usize {
        order.iter().position(|path| path == Path::new(name)).unwrap()
    }

    #[test]
    fn test_chain() {
        let (a, b, c) = (p("a"), p("b"), p("c"));
        // c references b, b references a
        let graph = BuildGraph::from_edges([(c.as_path(), b.as_path()), (b.as_path(), a.as_path())]);
        assert_eq!(graph.build_order().unwrap(), vec![a, b, c]);
    }

    #[test]
    fn test_diamond() {
        let (a, b, c, d) = (p("a"), p("b"), p("c"), p("d"));
        let graph = BuildGraph::from_edges([
            (d.as_path(), b.as_path()),
            (d.as_path(), c.as_path()),
            (b.as_path(), a.as_path()),
            (c.as_path(), a.as_path()),
        ]);
        let order = graph.build_order().unwrap();
        assert_eq!(order.len(), 4);
        assert!(position(&order, "a") < position(&order, "b"));
        assert!(position(&order, "a") < position(&order, "c"));
        assert!(position(&order, "b") < position(&order, "d"));
        assert!(position(&order, "c") < position(&order, "d"));
    }

    #[test]
    fn test_ties_follow_discovery_order() {
        let mut graph = BuildGraph::new();
        for name in ["x", "y", "z"] {
            graph.add_project(Path::new(name));
        }
        graph.add_dependency(Path::new("w"), Path::new("z"));
        assert_eq!(graph.build_order().unwrap(), vec![p("x"), p("y"), p("z"), p("w")]);
    }

    #[test]
    fn test_cycle_is_reported_as_a_path() {
        let (a, b) = (p("a"), p("b"));
        let graph = BuildGraph::from_edges([(a.as_path(), b.as_path()), (b.as_path(), a.as_path())]);
        assert_eq!(graph.find_cycle(), Some(vec![p("a"), p("b"), p("a")]));
        assert_eq!(
            graph.build_order().unwrap_err().to_string(),
            "Circular project reference detected: a -> b -> a"
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let a = p("a");
        let graph = BuildGraph::from_edges([(a.as_path(), a.as_path())]);
        assert!(graph.build_order().is_err());
    }

    #[test]
    fn test_dependent_of_a_cycle_reports_the_cycle() {
        let (a, b, c) = (p("a"), p("b"), p("c"));
        let graph = BuildGraph::from_edges([
            (c.as_path(), a.as_path()),
            (a.as_path(), b.as_path()),
            (b.as_path(), a.as_path()),
        ]);
        let BuildError::CircularReference(cycle) = graph.build_order().unwrap_err() else {
            panic!("expected a cycle");
        };
        assert_eq!(cycle, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_empty_graph_has_empty_order() {
        let graph = BuildGraph::new();
        assert!(graph.build_order().unwrap().is_empty());
    }
}
