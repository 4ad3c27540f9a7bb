//! Prelude module - common imports for microcalc users
//!
//! ```rust
//! use microcalc::prelude::*;
//! ```

pub use crate::{
    // Addressing
    CellAddress,
    // I/O types
    CsvReadOptions,
    CsvReader,
    CsvWriteOptions,
    CsvWriter,
    // Error types
    Error,
    // Evaluation types
    EvaluationOptions,
    EvaluationStats,
    Node,
    Result,
    // Main types
    Sheet,
    // Extension traits
    SheetExt,
};
