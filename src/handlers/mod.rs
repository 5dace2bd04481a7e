// src/handlers/mod.rs

pub mod admin;
pub mod curriculum;
pub mod exam;
pub mod exam_config;
