//! orthostat-export
//!
//! Text summary, chart images and DOCX reports built from a finished run.

pub mod capture;
pub mod chart;
pub mod docx;
pub mod error;
pub mod naming;
pub mod render;
pub mod report;
pub mod styles;
