//! Terminal presentation: a fixed status pane above a data pane that is
//! rewritten on every poll cycle.

pub mod dashboard;
pub mod screen;
pub mod ui;

pub use dashboard::Dashboard;
pub use screen::ScreenMode;
