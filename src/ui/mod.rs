pub mod app;
mod board;
mod catalog;
mod dialogs;
mod hud;
mod popup;
mod profiles;
mod routes;
mod state;
mod views;
