use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::intern::Id;
use crate::value::Value;

/// A node in the parent-linked lexical scope chain.
///
/// Scope-chain navigation (walking to find a declaration, deciding whether a
/// name is local) is the evaluator's job, not the scope's — this type only
/// knows about its own local bindings, matching `spec.md` §4.4.
#[derive(Debug, Default)]
pub struct Scope {
    values: HashMap<Id, Value>,
    parent: Option<ScopeRef>,
}

/// Shared handle to a `Scope`.
///
/// Closures keep a strong reference to their captured scope; a scope in turn
/// can reach closures declared inside it, so cycles are possible (a closure
/// capturing a scope that holds that very closure). This is accepted per
/// `spec.md` §5 — no cycle collector is implemented.
pub type ScopeRef = Rc<RefCell<Scope>>;

impl Scope {
    pub fn root() -> ScopeRef {
        Rc::new(RefCell::new(Self { values: HashMap::new(), parent: None }))
    }

    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Self { values: HashMap::new(), parent: Some(Rc::clone(parent)) }))
    }

    /// Whether `id` is bound in *this* scope (not its ancestors).
    pub fn has(&self, id: Id) -> bool {
        self.values.contains_key(&id)
    }

    /// Local-only lookup.
    pub fn try_get(&self, id: Id) -> Option<Value> {
        self.values.get(&id).cloned()
    }

    /// Local upsert — used both for fresh declarations and for in-place
    /// writes once the evaluator has located the owning scope.
    pub fn set(&mut self, id: Id, value: Value) {
        self.values.insert(id, value);
    }

    pub fn parent(&self) -> Option<ScopeRef> {
        self.parent.clone()
    }
}
