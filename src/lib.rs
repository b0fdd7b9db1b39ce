//! Core library for the dailylog command line application.
//!
//! The library keeps a date-keyed personal journal in a local SQLite file and
//! exchanges it with spreadsheets. Dates are normalized in
//! [`dailylog::tools::date`], spreadsheet headers are resolved in
//! [`dailylog::tools::columns`], persistence lives in [`dailylog::tools::store`],
//! xlsx adapters under [`dailylog::tools::io`], and the export/import
//! orchestration in [`dailylog::tools::sync`].

pub mod dailylog;

pub use dailylog::tools::{
    Result, ToolError, columns, config, date, error, flatten, io, model, store, sync,
};
