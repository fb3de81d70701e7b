pub mod collision;
pub mod constants;
pub mod controller;
pub mod engine;
pub mod entity;
pub mod persistence;
pub mod player;
pub mod spatial;
pub mod state;
pub mod systems;
