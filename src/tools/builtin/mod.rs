//! Built-in tools.

pub mod push;
pub mod search;
pub mod write_file;

pub use push::PushTool;
pub use search::SearchTool;
pub use write_file::WriteFileTool;
