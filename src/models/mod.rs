// src/models/mod.rs

pub mod curriculum;
pub mod exam;
pub mod exam_record;
