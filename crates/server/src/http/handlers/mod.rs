pub mod health;
pub mod nuke;
pub mod scan;
pub mod triggers;
