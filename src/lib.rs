pub mod arena;
pub mod bot;
pub mod error;
pub mod game;
pub mod search;
pub mod square;

pub use arena::*;
pub use bot::*;
pub use error::*;
pub use game::*;
pub use search::*;
pub use square::*;
