pub mod commands;
pub mod controller;
pub mod state;

pub use controller::TimerController;
pub use state::TimerState;
