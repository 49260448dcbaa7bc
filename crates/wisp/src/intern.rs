use std::collections::HashMap;

/// Dense small integer id for an interned identifier.
///
/// All scopes and AST identifier references use `Id`, never the raw string,
/// so comparisons and hash-map lookups stay cheap regardless of identifier
/// length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(u32);

impl Id {
    fn new(index: usize) -> Self {
        Self(index.try_into().expect("identifier pool exhausted"))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only string interner.
///
/// One pool per `Interpreter`, living as long as the interpreter: both
/// `run()` calls over a REPL session and a single file-mode run share it, so
/// identifiers declared on one REPL line keep the same `Id` on the next.
#[derive(Debug, Default)]
pub struct IdentifierPool {
    strings: Vec<String>,
    ids: HashMap<String, Id>,
}

impl IdentifierPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `name`, returning its id (existing or newly allocated).
    pub fn intern(&mut self, name: impl Into<String> + AsRef<str>) -> Id {
        if let Some(&id) = self.ids.get(name.as_ref()) {
            return id;
        }

        let id = Id::new(self.strings.len());
        let name = name.into();
        self.ids.insert(name.clone(), id);
        self.strings.push(name);
        id
    }

    /// Resolves an id back to its interned string.
    ///
    /// Panics if `id` was not produced by this pool — every `Id` in the AST
    /// or scope chain originates from the same pool it is looked up in.
    pub fn resolve(&self, id: Id) -> &str {
        &self.strings[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_name_twice_returns_the_same_id() {
        let mut pool = IdentifierPool::new();
        let a = pool.intern("foo");
        let b = pool.intern("foo");
        assert_eq!(a, b, "repeated interning of the same string must be idempotent");
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        let mut pool = IdentifierPool::new();
        let a = pool.intern("foo");
        let b = pool.intern("bar");
        assert_ne!(a, b);
        assert_eq!(pool.resolve(a), "foo");
        assert_eq!(pool.resolve(b), "bar");
    }
}
