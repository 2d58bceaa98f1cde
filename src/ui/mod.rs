//! egui rendering: toolbar and option panel, scatter plot, row preview.

pub mod panels;
pub mod plot;
pub mod table;
