//! # hourfill core
//!
//! The fill procedure for the monthly attendance report.
//!
//! ## Components
//!
//! - [`SessionBootstrap`] - log in and reach the report table
//! - [`RowEnumerator`] - walk the table's rows as [`RowRecord`]s
//! - [`CellFiller`] - write-verify one time cell with bounded retry
//! - [`RowLoop`] - drive the filler across rows and produce a [`RunSummary`]
//!
//! The procedure talks to the page only through the [`LoginSurface`] and
//! [`ReportTable`] traits. [`CdpPortal`] implements both over a live Chrome
//! page.

pub mod bootstrap;
pub mod cdp_portal;
pub mod error;
pub mod filler;
pub mod portal;
pub mod row;
pub mod runner;
pub mod time;

pub use bootstrap::SessionBootstrap;
pub use cdp_portal::CdpPortal;
pub use error::{FillError, Result};
pub use filler::{CellFiller, FillOutcome, FillTiming, read_current_value};
pub use portal::{CellRef, Column, InputProbe, LoginField, LoginSurface, ReportTable};
pub use row::{RowEnumerator, RowRecord, ScannedRow, is_non_workday};
pub use runner::{RowLoop, RowTiming, RunSummary};
pub use time::{TimeEntry, generate_time_entry, is_valid_time_format};
