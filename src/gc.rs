// ABOUTME: Garbage collector module implementing mark-and-sweep over arena handles
//! Stop-the-world mark-and-sweep collector for pairs, strings, symbols,
//! vectors, bytevectors, closures and environment frames.
//!
//! Two intrusive free lists back the arenas: a freed slot's storage is
//! reused for `Slot::Free { next }`, threading the freelist through the
//! same `Vec` that holds live values, rather than allocating a separate
//! free-list structure.

use std::cell::Cell;
use std::fmt;

use crate::value::{HeapObject, Value};

/// Handle to a heap-allocated `HeapObject`. Never dereferenced directly;
/// always resolved through a `Gc`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GcRef(pub(crate) usize);

impl fmt::Debug for GcRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GcRef({})", self.0)
    }
}

/// Handle to an environment frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvRef(pub(crate) usize);

impl fmt::Debug for EnvRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnvRef({})", self.0)
    }
}

enum Slot<T> {
    Live { value: T, marked: Cell<bool> },
    Free { next: Option<usize> },
}

/// One binding in an environment frame, linked like `struct binding` in
/// the original C: a small singly-linked list rather than a hash map,
/// since frames are typically tiny (lambda parameter lists).
pub struct Binding {
    pub name: String,
    pub value: Value,
    pub next: Option<Box<Binding>>,
}

pub struct Frame {
    pub bindings: Option<Box<Binding>>,
    pub parent: Option<EnvRef>,
}

pub struct Gc {
    values: Vec<Slot<HeapObject>>,
    envs: Vec<Slot<Frame>>,
    value_free: Option<usize>,
    env_free: Option<usize>,
    /// Root of the whole reachability graph: the top-level environment.
    /// Marking walks from here; it is never itself stored in `envs`.
    top_level: Option<EnvRef>,
    pub allocations: usize,
}

impl Gc {
    pub fn new() -> Self {
        Gc {
            values: Vec::new(),
            envs: Vec::new(),
            value_free: None,
            env_free: None,
            top_level: None,
            allocations: 0,
        }
    }

    pub fn set_top_level(&mut self, env: EnvRef) {
        self.top_level = Some(env);
    }

    pub fn top_level(&self) -> EnvRef {
        self.top_level.expect("top-level environment not set")
    }

    pub fn alloc_value(&mut self, object: HeapObject) -> GcRef {
        self.allocations += 1;
        if let Some(idx) = self.value_free {
            let next = match &self.values[idx] {
                Slot::Free { next } => *next,
                Slot::Live { .. } => unreachable!("freelist pointed at a live slot"),
            };
            self.value_free = next;
            self.values[idx] = Slot::Live {
                value: object,
                marked: Cell::new(false),
            };
            GcRef(idx)
        } else {
            self.values.push(Slot::Live {
                value: object,
                marked: Cell::new(false),
            });
            GcRef(self.values.len() - 1)
        }
    }

    pub fn alloc_env(&mut self, parent: Option<EnvRef>) -> EnvRef {
        let frame = Frame {
            bindings: None,
            parent,
        };
        if let Some(idx) = self.env_free {
            let next = match &self.envs[idx] {
                Slot::Free { next } => *next,
                Slot::Live { .. } => unreachable!("freelist pointed at a live slot"),
            };
            self.env_free = next;
            self.envs[idx] = Slot::Live {
                value: frame,
                marked: Cell::new(false),
            };
            EnvRef(idx)
        } else {
            self.envs.push(Slot::Live {
                value: frame,
                marked: Cell::new(false),
            });
            EnvRef(self.envs.len() - 1)
        }
    }

    pub fn get(&self, r: GcRef) -> &HeapObject {
        match &self.values[r.0] {
            Slot::Live { value, .. } => value,
            Slot::Free { .. } => panic!("dangling GcRef {:?}", r),
        }
    }

    pub fn get_mut(&mut self, r: GcRef) -> &mut HeapObject {
        match &mut self.values[r.0] {
            Slot::Live { value, .. } => value,
            Slot::Free { .. } => panic!("dangling GcRef {:?}", r),
        }
    }

    pub fn frame(&self, r: EnvRef) -> &Frame {
        match &self.envs[r.0] {
            Slot::Live { value, .. } => value,
            Slot::Free { .. } => panic!("dangling EnvRef {:?}", r),
        }
    }

    pub fn frame_mut(&mut self, r: EnvRef) -> &mut Frame {
        match &mut self.envs[r.0] {
            Slot::Live { value, .. } => value,
            Slot::Free { .. } => panic!("dangling EnvRef {:?}", r),
        }
    }

    /// Mark from the top-level environment and sweep both arenas.
    /// Called once after every top-level form is evaluated.
    pub fn collect(&mut self) {
        if let Some(top) = self.top_level {
            self.mark_env(top);
        }
        self.sweep_values();
        self.sweep_envs();
    }

    fn mark_value(&self, r: GcRef) {
        let already = match &self.values[r.0] {
            Slot::Live { marked, .. } => marked.replace(true),
            Slot::Free { .. } => return,
        };
        if already {
            return;
        }
        let children = match &self.values[r.0] {
            Slot::Live { value, .. } => value.children(),
            Slot::Free { .. } => return,
        };
        for child in children.values {
            self.mark_value(child);
        }
        if let Some(env) = children.env {
            self.mark_env(env);
        }
    }

    fn mark_env(&self, r: EnvRef) {
        let (already, parent, bindings_values) = match &self.envs[r.0] {
            Slot::Live { value, marked } => {
                let already = marked.replace(true);
                let mut vals = Vec::new();
                let mut cur = value.bindings.as_deref();
                while let Some(b) = cur {
                    if let Some(g) = b.value.gc_ref() {
                        vals.push(g);
                    }
                    cur = b.next.as_deref();
                }
                (already, value.parent, vals)
            }
            Slot::Free { .. } => return,
        };
        if already {
            return;
        }
        for v in bindings_values {
            self.mark_value(v);
        }
        if let Some(parent) = parent {
            self.mark_env(parent);
        }
    }

    fn sweep_values(&mut self) {
        for idx in 0..self.values.len() {
            let free_this = match &self.values[idx] {
                Slot::Live { marked, .. } => {
                    if marked.get() {
                        marked.set(false);
                        false
                    } else {
                        true
                    }
                }
                Slot::Free { .. } => false,
            };
            if free_this {
                self.values[idx] = Slot::Free {
                    next: self.value_free,
                };
                self.value_free = Some(idx);
            }
        }
    }

    fn sweep_envs(&mut self) {
        for idx in 0..self.envs.len() {
            let free_this = match &self.envs[idx] {
                Slot::Live { marked, .. } => {
                    if marked.get() {
                        marked.set(false);
                        false
                    } else {
                        true
                    }
                }
                Slot::Free { .. } => false,
            };
            if free_this {
                self.envs[idx] = Slot::Free {
                    next: self.env_free,
                };
                self.env_free = Some(idx);
            }
        }
    }

    pub fn live_value_count(&self) -> usize {
        self.values
            .iter()
            .filter(|s| matches!(s, Slot::Live { .. }))
            .count()
    }

    pub fn live_env_count(&self) -> usize {
        self.envs
            .iter()
            .filter(|s| matches!(s, Slot::Live { .. }))
            .count()
    }
}

impl Default for Gc {
    fn default() -> Self {
        Self::new()
    }
}

/// The set of references a heap object or frame points at, gathered for
/// marking. `values` covers pairs/vectors/closures' captured values;
/// `env` covers a closure's captured environment.
pub struct Children {
    pub values: Vec<GcRef>,
    pub env: Option<EnvRef>,
}
