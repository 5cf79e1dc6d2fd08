// App module for insight_dash
// Owns the dashboard state and the business logic around it

pub mod actions;
pub mod input;
pub mod state;

pub use actions::AppActions;
pub use input::handle_input;
pub use state::App;
