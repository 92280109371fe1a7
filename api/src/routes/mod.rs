pub mod chat_signals;
pub mod health;
pub mod insight_map;
