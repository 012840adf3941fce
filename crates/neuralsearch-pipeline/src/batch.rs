/// Size-bounded accumulator. Batch boundaries carry no meaning beyond throughput.
#[derive(Debug)]
pub struct Batcher<T> {
    size: usize,
    buf: Vec<T>,
}

impl<T> Batcher<T> {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self { size, buf: Vec::with_capacity(size) }
    }

    /// Adds `item`; returns the full batch once `size` items have accumulated.
    pub fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.buf.push(item);
        if self.buf.len() >= self.size {
            return Some(std::mem::replace(&mut self.buf, Vec::with_capacity(self.size)));
        }
        None
    }

    /// Drains the partial batch, if any.
    pub fn finish(&mut self) -> Option<Vec<T>> {
        if self.buf.is_empty() { None } else { Some(std::mem::take(&mut self.buf)) }
    }

    pub fn len(&self) -> usize { self.buf.len() }
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }
}
