pub mod allocator;
pub mod persistence;
pub mod sqlist;

pub use allocator::Allocator;
pub use persistence::{CounterFile, Counters};
pub use sqlist::SqList;
