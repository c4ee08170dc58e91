mod db;
pub use db::DatabaseHandler;

mod type_impl;
pub use type_impl::samples::SampleRange;
pub use type_impl::sessions::{PracticeRecord, RecordedEvent};

mod progress;

pub mod import;
pub mod recompute;
