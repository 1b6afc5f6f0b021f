/*
Davenstein - by David Petnick
*/
pub mod automap;
pub mod camera;
pub mod classify;
pub mod config;
pub mod error;
pub mod map;
pub mod palette;
pub mod player;
pub mod points;
pub mod render;
pub mod style;
pub mod ui;
pub mod view;
