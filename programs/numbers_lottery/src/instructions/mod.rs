pub mod admin;
pub mod bonus;
pub mod draw;
pub mod holds;
pub mod jackpot;
pub mod purchase;
pub mod roles;
pub mod settle;
pub mod slots;
pub mod wallet;
