pub mod pipeline;
pub mod registry;

pub use pipeline::{Pipeline, ReportInput};
pub use registry::AdapterRegistry;
