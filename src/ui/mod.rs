pub mod report;

pub use report::{render_catalog, render_estimate, render_records};
