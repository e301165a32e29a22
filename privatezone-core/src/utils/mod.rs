//! 工具函数

pub mod batch;
pub mod deadline;
pub mod normalize;
pub mod pagination;

pub use batch::batch_for_each;
pub use deadline::with_deadline;
pub use pagination::query_all;
