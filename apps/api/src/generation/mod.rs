// Batch generation: validation → per-set shuffle and layout → answer key.
// Sets run concurrently on the blocking pool; each paper is laid out sequentially.

pub mod generator;
pub mod handlers;
pub mod naming;
pub mod store;
