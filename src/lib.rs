//! Bottom panel for a desktop shell: a live window list, a workspace
//! switcher grid and a tray toggle, kept in step with the window manager
//! through the [`shell::Shell`] port.

pub mod compat;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod event_loop;
pub mod grid;
pub mod input;
pub mod logging;
pub mod message_button;
pub mod panel;
pub mod shell;
pub mod signals;
pub mod sim;
pub mod theme;
pub mod timer;
pub mod tooltip;
pub mod ui;
pub mod window_list;
pub mod workspace;

pub use panel::BottomPanel;
