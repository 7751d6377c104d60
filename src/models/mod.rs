// src/models/mod.rs

pub mod catalog;
pub mod question;
pub mod quiz;
pub mod score;
pub mod user;
