//! Per-call scoped arena: transient buffers for one `segment` call live
//! here and are released together when the arena is dropped, on every
//! exit path — success, fallback, or early return — for free, via
//! Rust's ordinary scope-exit drop instead of the reference C engine's
//! manual `arena_free` calls threaded through every branch
//! (`khmer_rule_engine.c`'s `MemArena`).

use bumpalo::Bump;

/// ~32 KiB inline chunk, sized to avoid heap traffic for typical
/// sentence-length inputs; `bumpalo` grows with additional heap-backed
/// chunks once that's exhausted.
const INITIAL_CHUNK_BYTES: usize = 32 * 1024;

pub struct CallArena {
    bump: Bump,
}

impl CallArena {
    pub fn new() -> Self {
        CallArena {
            bump: Bump::with_capacity(INITIAL_CHUNK_BYTES),
        }
    }

    pub fn bump(&self) -> &Bump {
        &self.bump
    }
}

impl Default for CallArena {
    fn default() -> Self {
        Self::new()
    }
}
