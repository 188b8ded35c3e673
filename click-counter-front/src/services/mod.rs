pub mod broadcast;
pub mod count;
pub mod health;
