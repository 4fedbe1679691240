pub mod gateway;
mod sqlite;
