use crate::collections::map::HashMap;
use crate::identity::ElementId;
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

/// Why a visibility callback fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisibilityReason {
    /// The element entered the observed region (viewport plus margin).
    Intersect,
    /// The document switched to print mode.
    Print,
}

impl VisibilityReason {
    pub fn as_str(self) -> &'static str {
        match self {
            VisibilityReason::Intersect => "intersect",
            VisibilityReason::Print => "print",
        }
    }
}

impl fmt::Display for VisibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared callback stored per watched element.
pub type VisibilityCallback = Rc<dyn Fn(VisibilityReason)>;

/// Snapshot of callbacks taken before a broadcast.
pub(crate) type CallbackSnapshot = SmallVec<[VisibilityCallback; 8]>;

/// One callback per watched element id.
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    callbacks: HashMap<ElementId, VisibilityCallback>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.callbacks.len())
            .finish()
    }
}

impl CallbackRegistry {
    /// Stores `callback` under `id`, returning the callback it replaced.
    pub(crate) fn insert(
        &mut self,
        id: ElementId,
        callback: VisibilityCallback,
    ) -> Option<VisibilityCallback> {
        self.callbacks.insert(id, callback)
    }

    pub(crate) fn get(&self, id: ElementId) -> Option<VisibilityCallback> {
        self.callbacks.get(&id).cloned()
    }

    pub(crate) fn remove(&mut self, id: ElementId) -> Option<VisibilityCallback> {
        self.callbacks.remove(&id)
    }

    pub(crate) fn contains(&self, id: ElementId) -> bool {
        self.callbacks.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Clones every callback so they can be invoked without holding a borrow
    /// of the registry.
    pub(crate) fn snapshot(&self) -> CallbackSnapshot {
        self.callbacks.values().cloned().collect()
    }
}
