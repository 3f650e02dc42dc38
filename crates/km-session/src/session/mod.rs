pub(crate) mod identity_context;
pub(crate) mod init_guard;
pub(crate) mod refresh;
pub(crate) mod session_manager;
pub(crate) mod session_state;

pub use identity_context::IdentityContext;
pub use session_manager::SessionManager;
pub use session_state::SessionState;
