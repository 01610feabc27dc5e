//! # Compact Pool
//!
//! Fixed-capacity storage whose live objects always occupy a contiguous prefix.

/// A fixed-capacity pool with a live-count cursor.
///
/// Slots `[0, len)` are live. Removal swaps the last live slot into the hole,
/// so the live range never has gaps and no tail is ever shifted. All storage
/// is allocated once in [`CompactPool::new`].
///
/// Removal does not preserve order. Anything that needs a stable identity
/// across frames must carry it inside `T`.
///
/// # Thread Safety
///
/// This pool is NOT synchronized. Keep it on the thread that owns the frame.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Default)]
/// struct Spark { life: f32 }
///
/// let mut pool: CompactPool<Spark> = CompactPool::new(300);
///
/// // Push - O(1), no heap allocation
/// pool.push(Spark { life: 1.0 });
///
/// // Age and compact in one pass - O(live), no heap allocation
/// pool.retain_mut(|s| { s.life -= 0.5; s.life > 0.0 });
/// ```
pub struct CompactPool<T> {
    /// The storage array, sized once.
    slots: Box<[T]>,
    /// Number of live objects at the front of `slots`.
    live: usize,
}

impl<T: Copy + Default> CompactPool<T> {
    /// Creates a new pool with the specified capacity.
    ///
    /// All memory is pre-allocated upfront.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        Self {
            slots: vec![T::default(); capacity].into_boxed_slice(),
            live: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live objects.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Returns true when nothing is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns true when every slot is live.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.live == self.slots.len()
    }

    /// Returns the number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.slots.len() - self.live
    }

    /// Stores `value` in the next free slot.
    ///
    /// Returns false (and drops `value`) when the pool is full.
    pub fn push(&mut self, value: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots[self.live] = value;
        self.live += 1;
        true
    }

    /// Live objects as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.slots[..self.live]
    }

    /// Iterates over live objects.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Removes the object at `index` by moving the last live object into it.
    pub fn swap_remove(&mut self, index: usize) -> Option<T> {
        if index >= self.live {
            return None;
        }
        let removed = self.slots[index];
        self.live -= 1;
        self.slots[index] = self.slots[self.live];
        Some(removed)
    }

    /// Visits every live object once, removing those for which `keep` is false.
    ///
    /// Single forward pass. When slot `i` dies, the last live object is moved
    /// into it and visited next, so every object is seen exactly once.
    ///
    /// Returns the number of objects removed.
    pub fn retain_mut<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&mut T) -> bool,
    {
        let before = self.live;
        let mut i = 0;
        while i < self.live {
            if keep(&mut self.slots[i]) {
                i += 1;
            } else {
                self.swap_remove(i);
            }
        }
        before - self.live
    }

    /// Forgets every live object. Memory is kept.
    pub fn clear(&mut self) {
        self.live = 0;
    }
}
