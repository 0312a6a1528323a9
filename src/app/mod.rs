//! Host side: wires the kernel to the editor, the auth manager and the
//! completion pipeline.

pub mod workbench;

pub use workbench::Workbench;
