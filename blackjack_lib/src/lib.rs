//! Table primitives shared by the blackjack simulations: cards, the shoe they are dealt from,
//! hand evaluation and the Hi-Lo running count.

pub mod card;
pub mod count;
pub mod error;
pub mod hand;
pub mod shoe;

pub use card::{Card, Rank, Suit, STANDARD_DECK};
pub use count::RunningCount;
pub use error::BlackjackGameError;
pub use hand::{hand_value, Hand};
pub use shoe::Shoe;
