pub mod code_table;
pub mod data;
pub mod policy;

pub use code_table::{CodeEntry, CodeTable, CodeTableError};
pub use data::{Notification, Observation, PublishMessage};
pub use policy::InvalidValuePolicy;
