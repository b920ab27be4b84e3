use crate::article::Article;

/// Number of articles carried by one SSE event
pub const BATCH_SIZE: usize = 3;

/// Contiguous group of articles, the unit of emission
pub type Batch = Vec<Article>;

/// Split `items` into consecutive groups of `size`, preserving order.
///
/// Every group holds exactly `size` items except possibly the last one,
/// which carries the remainder. A `size` of zero is treated as one.
pub fn batch<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);

    for item in items {
        current.push(item);
        if current.len() == size {
            batches.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
