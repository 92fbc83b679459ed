//! ScriptSet - ordered registry of compiled scripts
//!
//! Scripts live in an arena and never move once appended; a [`ScriptId`]
//! stays valid for the life of the set. Order is a chain of successor links
//! between ids, so reordering rewrites links and leaves the scripts in place.

use std::cmp::Ordering;
use tracing::debug;

use crate::script::{Script, ScriptConfig};

/// Stable handle to a script in a [`ScriptSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptId(usize);

#[derive(Debug)]
struct Node {
    script: Script,
    next: Option<ScriptId>,
}

#[derive(Debug, Default)]
pub struct ScriptSet {
    nodes: Vec<Node>,
    head: Option<ScriptId>,
    tail: Option<ScriptId>,
}

impl ScriptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set in configuration order
    pub fn from_configs<'a>(configs: impl IntoIterator<Item = &'a ScriptConfig>) -> Self {
        let mut set = Self::new();
        for config in configs {
            set.append(Script::from_config(config));
        }
        set
    }

    /// Add a script at the end of the current order
    pub fn append(&mut self, script: Script) -> ScriptId {
        let id = ScriptId(self.nodes.len());
        self.nodes.push(Node { script, next: None });
        match self.tail {
            Some(tail) => self.nodes[tail.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id of the first script in order
    pub fn first(&self) -> Option<ScriptId> {
        self.head
    }

    /// Id following `id` in order
    pub fn next(&self, id: ScriptId) -> Option<ScriptId> {
        self.nodes.get(id.0).and_then(|node| node.next)
    }

    pub fn get(&self, id: ScriptId) -> Option<&Script> {
        self.nodes.get(id.0).map(|node| &node.script)
    }

    /// First script in order with this exact name
    pub fn find(&self, name: &str) -> Option<&Script> {
        self.iter().find(|script| script.name() == name)
    }

    /// Zero-based position of `id` in the current order
    pub fn position(&self, id: ScriptId) -> Option<usize> {
        self.ids().position(|candidate| candidate == id)
    }

    /// Ids in order
    pub fn ids(&self) -> Ids<'_> {
        Ids {
            set: self,
            current: self.head,
        }
    }

    /// Scripts in order
    pub fn iter(&self) -> impl Iterator<Item = &Script> + '_ {
        self.ids().filter_map(|id| self.get(id))
    }

    /// Reorder so that no script compares `Greater` than its successor.
    ///
    /// Bubble sort over the successor links: adjacent pairs that compare
    /// `Greater` swap places in the chain. Equal scripts keep their relative
    /// order.
    pub fn sort<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Script, &Script) -> Ordering,
    {
        let mut remaining = self.count();
        if remaining < 2 {
            return;
        }

        let mut swaps = 0usize;
        while remaining > 1 {
            remaining -= 1;
            let mut link: Option<ScriptId> = None;
            let mut a = self.head;
            for _ in 0..remaining {
                let Some(a_id) = a else { break };
                let Some(b_id) = self.nodes[a_id.0].next else {
                    break;
                };

                let current = if compare(&self.nodes[a_id.0].script, &self.nodes[b_id.0].script)
                    == Ordering::Greater
                {
                    self.nodes[a_id.0].next = self.nodes[b_id.0].next;
                    self.nodes[b_id.0].next = Some(a_id);
                    match link {
                        Some(prev) => self.nodes[prev.0].next = Some(b_id),
                        None => self.head = Some(b_id),
                    }
                    swaps += 1;
                    b_id
                } else {
                    a_id
                };
                link = Some(current);
                a = self.nodes[current.0].next;
            }
        }

        self.tail = self.ids().last();
        debug!(count = self.count(), swaps, "sorted scripts");
    }
}

/// Iterator over ids in set order
pub struct Ids<'a> {
    set: &'a ScriptSet,
    current: Option<ScriptId>,
}

impl Iterator for Ids<'_> {
    type Item = ScriptId;

    fn next(&mut self) -> Option<ScriptId> {
        let id = self.current?;
        self.current = self.set.next(id);
        Some(id)
    }
}

impl<'a> IntoIterator for &'a ScriptSet {
    type Item = &'a Script;
    type IntoIter = Box<dyn Iterator<Item = &'a Script> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
