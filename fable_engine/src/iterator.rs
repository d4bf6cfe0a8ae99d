//! Cursor over a branching command list.
//!
//! The path into the tree is a flat index vector: element 0 is the offset
//! into the top-level list, then each `(branch, offset)` pair descends one
//! nesting level. Branch choice and label jumps are the only non-sequential
//! moves; the program itself is never mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fable_data::{Command, CommandKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandIterator {
    commands: Vec<Option<Command>>,
    indices: Vec<usize>,
    /// Label name to path, first occurrence wins. Rebuilt on demand after
    /// deserialization.
    #[serde(skip)]
    labels: Option<BTreeMap<String, Vec<usize>>>,
}

/// The label index is a cache of `commands`; a restored cursor compares
/// equal to the one that was saved.
impl PartialEq for CommandIterator {
    fn eq(&self, other: &Self) -> bool {
        self.commands == other.commands && self.indices == other.indices
    }
}

impl CommandIterator {
    pub fn new(commands: Vec<Option<Command>>) -> Self {
        let mut it = Self {
            commands,
            indices: vec![0],
            labels: None,
        };
        it.labels = Some(collect_labels(&it.commands));
        it
    }

    pub fn is_terminated(&self) -> bool {
        self.indices.is_empty()
    }

    /// The command under the cursor. `None` when terminated or when the
    /// cursor sits on a nil slot; callers step past nil slots themselves.
    pub fn command(&self) -> Option<&Command> {
        if self.indices.is_empty() {
            return None;
        }
        let mut list: &[Option<Command>] = &self.commands;
        let mut i = 0;
        loop {
            let slot = list.get(self.indices[i])?;
            let command = slot.as_ref()?;
            if i + 2 > self.indices.len() - 1 {
                return Some(command);
            }
            list = command.branch(self.indices[i + 1]);
            i += 2;
        }
    }

    /// Steps to the next command at the current nesting level, popping out
    /// of exhausted branches.
    pub fn advance(&mut self) {
        if let Some(last) = self.indices.last_mut() {
            *last += 1;
        }
        self.unindent_if_needed();
    }

    /// Descends into branch `index` of the current command.
    pub fn choose(&mut self, index: usize) {
        self.indices.push(index);
        self.indices.push(0);
        self.unindent_if_needed();
    }

    /// Jumps to the first occurrence of `label`, at any nesting depth.
    /// Returns false when no such label exists.
    pub fn goto(&mut self, label: &str) -> bool {
        let labels = self
            .labels
            .get_or_insert_with(|| collect_labels(&self.commands));
        match labels.get(label) {
            Some(path) => {
                self.indices = path.clone();
                true
            }
            None => false,
        }
    }

    pub fn rewind(&mut self) {
        self.indices = vec![0];
    }

    fn unindent_if_needed(&mut self) {
        loop {
            let len = self.level_len();
            let Some(&offset) = self.indices.last() else {
                return;
            };
            if offset < len {
                return;
            }
            self.indices.pop();
            if self.indices.pop().is_none() {
                return;
            }
            if let Some(last) = self.indices.last_mut() {
                *last += 1;
            }
        }
    }

    /// Length of the command list the cursor's last offset indexes into.
    fn level_len(&self) -> usize {
        if self.indices.is_empty() {
            return 0;
        }
        let mut list: &[Option<Command>] = &self.commands;
        let mut i = 0;
        while i + 2 < self.indices.len() {
            let Some(Some(command)) = list.get(self.indices[i]) else {
                return 0;
            };
            list = command.branch(self.indices[i + 1]);
            i += 2;
        }
        list.len()
    }
}

fn collect_labels(commands: &[Option<Command>]) -> BTreeMap<String, Vec<usize>> {
    let mut labels = BTreeMap::new();
    let mut path = Vec::new();
    collect_into(commands, &mut path, &mut labels);
    labels
}

fn collect_into(
    commands: &[Option<Command>],
    path: &mut Vec<usize>,
    labels: &mut BTreeMap<String, Vec<usize>>,
) {
    for (offset, slot) in commands.iter().enumerate() {
        let Some(command) = slot else { continue };
        path.push(offset);
        if let CommandKind::Label(args) = &command.kind {
            labels
                .entry(args.name.clone())
                .or_insert_with(|| path.clone());
        }
        for branch in 0..command.branch_count() {
            path.push(branch);
            collect_into(command.branch(branch), path, labels);
            path.pop();
        }
        path.pop();
    }
}
