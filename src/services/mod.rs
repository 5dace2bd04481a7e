// src/services/mod.rs

pub mod curriculum_cache;
pub mod exam_generator;
pub mod scoring;
