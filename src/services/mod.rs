pub mod booking;
pub mod messaging;
pub mod nlu;
pub mod turn;
