//! Stack dependency graph
//!
//! Orders stacks so that every stack is provisioned after the stacks it
//! depends on. Ordering is deterministic: among stacks that are ready at the
//! same time, ids are taken in lexical order.

use crate::error::{CloudError, Result};
use crate::stack::StackSpec;
use std::collections::{BTreeMap, BTreeSet};

/// Graph of stacks keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackGraph {
    stacks: BTreeMap<String, StackSpec>,
}

impl StackGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from previously recorded stacks
    pub fn from_stacks(stacks: impl IntoIterator<Item = StackSpec>) -> Result<Self> {
        let stacks: Vec<StackSpec> = stacks.into_iter().collect();
        let mut graph = Self::new();
        let mut edges = Vec::new();
        for mut stack in stacks {
            let depends_on = std::mem::take(&mut stack.depends_on);
            edges.extend(depends_on.into_iter().map(|dep| (stack.id.clone(), dep)));
            graph.add(stack)?;
        }
        for (dependent, dependency) in edges {
            graph.add_dependency(&dependent, &dependency)?;
        }
        Ok(graph)
    }

    /// Add a stack
    pub fn add(&mut self, stack: StackSpec) -> Result<()> {
        if self.stacks.contains_key(&stack.id) {
            return Err(CloudError::DuplicateStack(stack.id));
        }
        for dependency in &stack.depends_on {
            if !self.stacks.contains_key(dependency) {
                return Err(CloudError::StackNotFound(dependency.clone()));
            }
        }
        self.stacks.insert(stack.id.clone(), stack);
        Ok(())
    }

    /// Declare that `dependent` must be provisioned after `dependency`
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> Result<()> {
        if dependent == dependency {
            return Err(CloudError::SelfDependency(dependent.to_string()));
        }
        if !self.stacks.contains_key(dependency) {
            return Err(CloudError::StackNotFound(dependency.to_string()));
        }
        let stack = self
            .stacks
            .get_mut(dependent)
            .ok_or_else(|| CloudError::StackNotFound(dependent.to_string()))?;
        stack.depends_on.insert(dependency.to_string());
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&StackSpec> {
        self.stacks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stacks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Stacks in id order
    pub fn iter(&self) -> impl Iterator<Item = &StackSpec> {
        self.stacks.values()
    }

    /// All `(dependent, dependency)` edges
    pub fn dependency_pairs(&self) -> Vec<(String, String)> {
        self.stacks
            .values()
            .flat_map(|stack| {
                stack
                    .depends_on
                    .iter()
                    .map(move |dep| (stack.id.clone(), dep.clone()))
            })
            .collect()
    }

    /// Topological order of stack ids (Kahn's algorithm)
    pub fn deployment_order(&self) -> Result<Vec<String>> {
        let mut remaining: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for stack in self.stacks.values() {
            remaining.insert(&stack.id, stack.depends_on.len());
            for dep in &stack.depends_on {
                dependents.entry(dep.as_str()).or_default().push(&stack.id);
            }
        }

        let mut ready: BTreeSet<&str> = remaining
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(self.stacks.len());

        while let Some(id) = ready.pop_first() {
            order.push(id.to_string());
            remaining.remove(id);
            for dependent in dependents.get(id).into_iter().flatten() {
                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if !remaining.is_empty() {
            return Err(CloudError::CircularDependency(self.find_cycle(&remaining)));
        }

        Ok(order)
    }

    /// Ids forming one cycle among the stacks left unsorted
    ///
    /// Every unsorted stack still has an unsorted dependency, so following
    /// those dependencies from any of them must revisit a stack.
    fn find_cycle<'a>(&'a self, remaining: &BTreeMap<&'a str, usize>) -> Vec<String> {
        let mut path: Vec<&str> = Vec::new();
        let mut current = remaining.keys().next().copied();

        while let Some(id) = current {
            if let Some(start) = path.iter().position(|visited| *visited == id) {
                path.drain(..start);
                break;
            }
            path.push(id);
            current = self.stacks.get(id).and_then(|stack| {
                stack
                    .depends_on
                    .iter()
                    .map(String::as_str)
                    .find(|dep| remaining.contains_key(dep))
            });
        }

        path.into_iter().map(str::to_string).collect()
    }

    /// Stacks grouped by dependency depth
    ///
    /// Every stack in wave `n` depends only on stacks in earlier waves, so a
    /// wave can be provisioned in parallel once the previous one finished.
    pub fn waves(&self) -> Result<Vec<Vec<String>>> {
        let order = self.deployment_order()?;
        let mut depth: BTreeMap<&str, usize> = BTreeMap::new();
        let mut waves: Vec<Vec<String>> = Vec::new();

        for id in &order {
            let level = self.stacks[id]
                .depends_on
                .iter()
                .filter_map(|dep| depth.get(dep.as_str()))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(id, level);
            if waves.len() <= level {
                waves.resize_with(level + 1, Vec::new);
            }
            waves[level].push(id.clone());
        }

        for wave in &mut waves {
            wave.sort();
        }
        Ok(waves)
    }
}
