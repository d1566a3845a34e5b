//! Adjacency-list helpers for parent-pointer tables.
//!
//! Rows are indexed once per call (id → position, parent → children) and every
//! walk keeps a visited set, so a corrupted table with a parent cycle produces
//! [`TreeError::CycleDetected`] instead of an endless loop. A `parent_id` that
//! is null, zero or points at an unknown row makes that row a root.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::shared::constants::TREE_INDENT;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("cycle detected at node {id}")]
    CycleDetected { id: i64 },
}

/// A row of a parent-pointer table
pub trait AdjacencyRow {
    fn id(&self) -> i64;
    fn parent_id(&self) -> Option<i64>;

    /// Sibling sort key
    fn order(&self) -> i32 {
        0
    }
}

/// Tree view over a flat slice of rows
pub struct TreeBuilder<'a, T> {
    rows: &'a [T],
    index: HashMap<i64, usize>,
    children: HashMap<usize, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a, T: AdjacencyRow> TreeBuilder<'a, T> {
    pub fn new(rows: &'a [T]) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        let mut kept = Vec::with_capacity(rows.len());

        for (pos, row) in rows.iter().enumerate() {
            if index.contains_key(&row.id()) {
                tracing::warn!("Skipping duplicate tree row with id={}", row.id());
                continue;
            }
            index.insert(row.id(), pos);
            kept.push(pos);
        }

        // Stable sort, so fetch order breaks ties between equal `order` values
        kept.sort_by_key(|&pos| rows[pos].order());

        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();

        for pos in kept {
            let row = &rows[pos];
            match row.parent_id().filter(|parent| *parent != 0) {
                Some(parent) => match index.get(&parent) {
                    Some(&parent_pos) => children.entry(parent_pos).or_default().push(pos),
                    None => {
                        tracing::warn!(
                            "Row id={} references unknown parent_id={}, treating it as a root",
                            row.id(),
                            parent
                        );
                        roots.push(pos);
                    }
                },
                None => roots.push(pos),
            }
        }

        Self {
            rows,
            index,
            children,
            roots,
        }
    }

    fn children_of(&self, pos: usize) -> &[usize] {
        self.children.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fails when some rows cannot be reached from a root, which only happens
    /// when their parent chain loops back on itself
    fn ensure_acyclic(&self) -> Result<(), TreeError> {
        let mut visited = HashSet::with_capacity(self.index.len());
        let mut stack: Vec<usize> = self.roots.clone();

        while let Some(pos) = stack.pop() {
            if !visited.insert(pos) {
                return Err(TreeError::CycleDetected {
                    id: self.rows[pos].id(),
                });
            }
            stack.extend_from_slice(self.children_of(pos));
        }

        if visited.len() == self.index.len() {
            return Ok(());
        }

        // Any unreachable row sits on or below a cycle; walk up until a repeat
        let mut unreachable: Vec<usize> = self
            .index
            .values()
            .copied()
            .filter(|pos| !visited.contains(pos))
            .collect();
        unreachable.sort_unstable();

        let mut seen = HashSet::new();
        let mut current = unreachable[0];
        loop {
            let row = &self.rows[current];
            if !seen.insert(current) {
                return Err(TreeError::CycleDetected { id: row.id() });
            }
            match row.parent_id().and_then(|parent| self.index.get(&parent)) {
                Some(&parent_pos) => current = parent_pos,
                None => return Err(TreeError::CycleDetected { id: row.id() }),
            }
        }
    }

    /// Renders the nested structure, building each node from its row and its
    /// already-built children
    pub fn build<N, F>(&self, mut make: F) -> Result<Vec<N>, TreeError>
    where
        F: FnMut(&T, Vec<N>) -> N,
    {
        self.ensure_acyclic()?;

        let mut nodes = Vec::with_capacity(self.roots.len());
        for &root in &self.roots {
            nodes.push(self.build_node(root, &mut make));
        }
        Ok(nodes)
    }

    fn build_node<N, F>(&self, pos: usize, make: &mut F) -> N
    where
        F: FnMut(&T, Vec<N>) -> N,
    {
        let mut children = Vec::with_capacity(self.children_of(pos).len());
        for &child in self.children_of(pos) {
            children.push(self.build_node(child, make));
        }
        make(&self.rows[pos], children)
    }

    /// Depth-first `(id, label)` pairs with the label prefixed once per
    /// nesting level, ready for a select dropdown
    pub fn flatten<F>(&self, label: F) -> Result<Vec<(i64, String)>, TreeError>
    where
        F: Fn(&T) -> String,
    {
        self.ensure_acyclic()?;

        let mut out = Vec::with_capacity(self.index.len());
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&p| (p, 0)).collect();

        while let Some((pos, depth)) = stack.pop() {
            let row = &self.rows[pos];
            out.push((row.id(), format!("{}{}", TREE_INDENT.repeat(depth), label(row))));
            for &child in self.children_of(pos).iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        Ok(out)
    }

    /// All descendant ids of `id`, parents before their children.
    /// Unknown ids have no descendants.
    pub fn find_child_node_ids(&self, id: i64) -> Result<Vec<i64>, TreeError> {
        let Some(&start) = self.index.get(&id) else {
            return Ok(Vec::new());
        };

        let mut visited = HashSet::from([start]);
        let mut ids = Vec::new();
        let mut stack: Vec<usize> = self.children_of(start).iter().rev().copied().collect();

        while let Some(pos) = stack.pop() {
            if !visited.insert(pos) {
                return Err(TreeError::CycleDetected {
                    id: self.rows[pos].id(),
                });
            }
            ids.push(self.rows[pos].id());
            stack.extend(self.children_of(pos).iter().rev().copied());
        }

        Ok(ids)
    }
}

/// Ancestor chain of `target_id`, root first and the target last, with each
/// row passed through `map`. An unknown target yields an empty list.
pub fn build_breadcrumbs<T, B, F>(rows: &[T], target_id: i64, map: F) -> Result<Vec<B>, TreeError>
where
    T: AdjacencyRow,
    F: FnMut(&T) -> B,
{
    let mut index: HashMap<i64, &T> = HashMap::with_capacity(rows.len());
    for row in rows {
        index.entry(row.id()).or_insert(row);
    }

    let Some(&target) = index.get(&target_id) else {
        return Ok(Vec::new());
    };

    let mut visited = HashSet::new();
    let mut chain = Vec::new();
    let mut current = target;

    loop {
        if !visited.insert(current.id()) {
            return Err(TreeError::CycleDetected { id: current.id() });
        }
        chain.push(current);

        match current
            .parent_id()
            .filter(|parent| *parent != 0)
            .and_then(|parent| index.get(&parent))
        {
            Some(&parent) => current = parent,
            None => break,
        }
    }

    Ok(chain.into_iter().rev().map(map).collect())
}
