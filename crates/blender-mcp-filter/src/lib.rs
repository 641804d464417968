//! Blender MCP Filter - keeps a JSON-RPC stdout stream clean
//!
//! Blender writes its startup banner, add-on chatter and Python warnings to
//! stdout. When Blender hosts an MCP server over stdio that noise lands in the
//! middle of the protocol stream. This crate runs the child process and passes
//! through only complete JSON objects and arrays, while stderr is forwarded
//! untouched.
//!
//! - [`demux`] - the incremental frame extractor
//! - [`child`] - process spawning and pipe pumping
//! - [`config`] - command line options

pub mod child;
pub mod config;
pub mod demux;

pub use child::{RunSettings, exit_code, run};
pub use config::FilterConfig;
pub use demux::{BufferState, FilterLimits, FrameFilter};
