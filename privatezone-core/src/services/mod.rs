//! 业务逻辑服务层

mod reconciler;
mod record_store;
mod zone_directory;

pub use reconciler::{
    DEFAULT_BATCH_SIZE, DEFAULT_PAGE_SIZE, Reconciler, ReconcilerOptions, UpdateStrategy,
};
pub use record_store::RecordStore;
pub use zone_directory::{ZoneDirectory, ZoneIndex};
