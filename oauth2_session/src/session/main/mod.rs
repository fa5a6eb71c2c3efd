mod session;

pub use session::{SessionManager, spawn_session_sweeper};
