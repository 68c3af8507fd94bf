// Tool surface: the declared catalogue and the dispatcher that serves it
pub mod catalog;   // tool names + parameter schemas
pub mod dispatch;  // argument validation, routing, result envelopes

pub use catalog::{catalog, Tool, ToolSpec};
pub use dispatch::{Arguments, ToolDispatcher, ToolResult};
