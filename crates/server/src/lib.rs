pub mod errors;
pub mod executor;
pub mod scores;
pub mod service;
pub mod session_handle;
pub mod transport;
pub mod types;

pub use errors::{SessionError, StartGameError, TransportError};
pub use executor::{ExecutorHandle, GameExecutor, TickPacer};
pub use scores::{InMemoryScoreStore, ScoreStore};
pub use service::GameSessionService;
pub use session_handle::{SessionHandle, StepOutcome};
pub use transport::{InMemoryTransport, Transport};
pub use types::{CloseStatus, ServerConfig, SessionId, SessionInfo};
