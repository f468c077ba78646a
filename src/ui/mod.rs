//! Presentation shell: egui panels, tables and charts rendering
//! [`crate::analysis::pipeline::Analysis`].

pub mod panels;
pub mod plot;
pub mod report;
pub mod tables;
