pub mod class_id;
pub mod facts;
pub mod types;

pub use class_id::{extract_class_id, ClassId};
pub use facts::normalize;
pub use types::{FactDocument, FactRow, FactSeries, FactValue, ValueColumn};
