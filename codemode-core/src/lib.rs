//! Codemode core - tool model and typed-interface generation
//!
//! Defines the tool snapshot record, the `ToolInvoker` collaborator contract
//! the sandbox depends on, and the schema-to-interface generator with its
//! process-lifetime cache.

pub mod ident;
pub mod interface;
pub mod tool;

pub use ident::sanitize_identifier;
pub use interface::ToolInterfaceGenerator;
pub use tool::{InvokeError, Tool, ToolInvoker};
