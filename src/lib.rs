pub mod controller;
pub mod game;
pub mod turn;

pub use controller::*;
pub use game::*;
pub use turn::*;
