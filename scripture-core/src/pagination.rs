pub const BATCH_SIZE: usize = 50;

/// Reveals an ordered result list in fixed-size batches.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    revealed: usize,
    batch_size: usize,
}

impl<T> Default for Paginator<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::with_batch_size(items, BATCH_SIZE)
    }

    pub fn with_batch_size(items: Vec<T>, batch_size: usize) -> Self {
        Self { items, revealed: 0, batch_size: batch_size.max(1) }
    }

    /// Replaces the results and rewinds the cursor.
    pub fn reset(&mut self, items: Vec<T>) {
        self.items = items;
        self.revealed = 0;
    }

    /// The next contiguous slice after everything revealed so far; empty once exhausted.
    pub fn next_batch(&mut self) -> &[T] {
        let start = self.revealed;
        let end = (start + self.batch_size).min(self.items.len());
        self.revealed = end;
        &self.items[start..end]
    }

    pub fn has_more(&self) -> bool { self.revealed < self.items.len() }
    pub fn remaining(&self) -> usize { self.items.len() - self.revealed }
    pub fn revealed(&self) -> usize { self.revealed }
    pub fn total(&self) -> usize { self.items.len() }

    /// Everything revealed so far.
    pub fn shown(&self) -> &[T] { &self.items[..self.revealed] }
}
