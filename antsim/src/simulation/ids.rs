/// Video ids of one entity kind.
///
/// Released ids are handed out again, lowest first, so long runs stay
/// within the `u16` id space.
#[derive(Debug, Clone, Default)]
pub struct IdPool {
    next: u32,
    free: Vec<u16>,
}

impl IdPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` once every id is live.
    pub fn allocate(&mut self) -> Option<u16> {
        if let Some(id) = self.free.pop() {
            return Some(id);
        }
        let id = u16::try_from(self.next).ok()?;
        self.next += 1;
        Some(id)
    }

    /// Makes `id` available again. Only call this after its `Remove` block
    /// has been written.
    pub fn release(&mut self, id: u16) {
        debug_assert!(!self.free.contains(&id), "id {id} released twice");
        // Keep the stack sorted descending so `pop` yields the lowest id.
        let index = self.free.partition_point(|&free| free > id);
        self.free.insert(index, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_count_up() {
        let mut pool = IdPool::new();
        assert_eq!(pool.allocate(), Some(0));
        assert_eq!(pool.allocate(), Some(1));
        assert_eq!(pool.allocate(), Some(2));
    }

    #[test]
    fn test_released_ids_are_reused_lowest_first() {
        let mut pool = IdPool::new();
        for _ in 0..5 {
            pool.allocate();
        }
        pool.release(3);
        pool.release(1);
        assert_eq!(pool.allocate(), Some(1));
        assert_eq!(pool.allocate(), Some(3));
        assert_eq!(pool.allocate(), Some(5));
    }

    #[test]
    fn test_pool_runs_out() {
        let mut pool = IdPool::new();
        for _ in 0..=u16::MAX as u32 {
            assert!(pool.allocate().is_some());
        }
        assert_eq!(pool.allocate(), None);
        pool.release(7);
        assert_eq!(pool.allocate(), Some(7));
    }
}
