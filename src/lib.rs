//! Label table rows by brushing points on a scatter plot.
//!
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────────┐
//!   │ LabelController   │  brush → selection → label column
//!   └──────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ LabelView │  plot + controls + counts (egui)
//!   └──────────┘
//! ```

pub mod app;
pub mod color;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod labels;
pub mod state;
pub mod ui;
pub mod view;

pub use config::LabelOptions;
pub use controller::{LabelController, Selection};
pub use data::model::Table;
pub use error::LabelError;
pub use view::{label, LabelView};
