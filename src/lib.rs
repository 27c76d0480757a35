//! Mini-game arcade - a web arcade of browser-playable mini-games
//!
//! This crate provides the web application behind the arcade:
//! - Accounts with session login, by username or phone number
//! - Phone verification codes for sign-up (demo flow, codes are returned to the caller)
//! - Admin publishing of games whose markup and script run in the browser
//! - Play history and 1-5 star ratings, with games ranked by average rating

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod error;
pub mod flash;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod utils;
