//! Scratch storage for one `diff` invocation (spec §5, §9 "Arena-scoped
//! allocation"): the source threads a hierarchical pool allocator through
//! the whole recursive walk. This crate doesn't need arbitrary-typed
//! allocation, just the scratch path strings built while recursing into
//! child directories — so a `Vec<String>` with RAII release on every exit
//! path (drop, not an explicit free call) satisfies the same requirement
//! without `unsafe`.
#[derive(Default)]
pub struct ScratchArena {
    buffers: Vec<String>,
}

impl ScratchArena {
    pub fn new() -> ScratchArena {
        ScratchArena::default()
    }

    /// Joins `parent` and `name` with `/` (or returns `name` alone if
    /// `parent` is empty) and hands back a reference that lives as long as
    /// the arena does.
    pub fn join_path(&mut self, parent: &str, name: &str) -> &str {
        let joined = if parent.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent, name)
        };
        self.buffers.push(joined);
        self.buffers.last().unwrap().as_str()
    }
}

impl Drop for ScratchArena {
    fn drop(&mut self) {
        log::trace!("scratch arena released ({} buffers)", self.buffers.len());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn joins_and_releases() {
        let mut arena = ScratchArena::new();
        assert_eq!(arena.join_path("", "a"), "a");
        assert_eq!(arena.join_path("a", "b"), "a/b");
    }
}
