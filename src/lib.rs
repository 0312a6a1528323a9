//! whisperline - inline completion controller for editors
//!
//! Module layout:
//! - kernel: headless core (language mapping, trigger state machine,
//!   recommendation session, auth manager, request pipeline)
//! - app: host wiring (Workbench)

pub mod app;
pub mod kernel;
