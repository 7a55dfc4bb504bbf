/// Fixed ring of `N` back-buffer slots with a cyclic cursor.
///
/// Either every slot is filled or none is; [`BackBufferRing::fill`] replaces them all at once.
pub struct BackBufferRing<T, const N: usize> {
    slots: [Option<T>; N],
    current: usize,
}

impl<T, const N: usize> Default for BackBufferRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> BackBufferRing<T, N> {
    pub fn new() -> Self {
        Self {
            slots: array_init::array_init(|_| None),
            current: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&T> {
        self.slots[self.current].as_ref()
    }

    pub fn is_filled(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Moves the cursor to the next slot, wrapping after `N`.
    pub fn advance(&mut self) -> usize {
        self.current = (self.current + 1) % N;
        self.current
    }

    /// Drops every buffer and rewinds the cursor.
    pub fn clear(&mut self) {
        self.slots = array_init::array_init(|_| None);
        self.current = 0;
    }

    /// Fills every slot from `make(index)`, rewinding the cursor.
    ///
    /// On error the ring is left empty.
    pub fn fill<E>(&mut self, mut make: impl FnMut(usize) -> Result<T, E>) -> Result<(), E> {
        self.clear();
        let filled: [T; N] = array_init::try_array_init(|index| make(index))?;
        self.slots = filled.map(Some);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }
}
