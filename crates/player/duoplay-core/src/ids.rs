//! Content identifiers and their allocator.

use serde::{Deserialize, Serialize};

/// Identity of one media resource. Two descriptors are the same source iff their ids match,
/// regardless of url or name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub u32);

/// Monotonic allocator for ContentId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_content: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_content(&mut self) -> ContentId {
        let id = ContentId(self.next_content);
        self.next_content = self.next_content.wrapping_add(1);
        id
    }
}
