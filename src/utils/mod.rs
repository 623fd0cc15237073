pub mod report_writer;
pub mod string;

pub use report_writer::ReportWriter;
pub use string::{join_optional_tokens, join_tokens};
