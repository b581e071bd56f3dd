pub mod board;
pub mod records;
pub mod session;
pub mod store;

pub use board::GridSize;
pub use records::{GameRecord, ScoreStore};
pub use session::{GameSession, Phase, RenderCommand, ResolveTicket, Status};
pub use store::JsonFileStore;
