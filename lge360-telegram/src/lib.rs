//! Telegram layer for the Landis+Gyr E360
//!
//! The meter pushes a text telegram on its customer port at a fixed rate.
//! Each telegram starts with an identification line (`/LGF5E360`), carries
//! one OBIS data record per line, and ends with `!`.
//!
//! # Pipeline
//!
//! raw bytes → [`TelegramFramer`] → [`Telegram`] → [`ObisRecordParser`]
//! → [`RawRecord`]s → [`SemanticMapper`] → [`Reading`]s → [`ZeroValueFilter`]
//! → [`ReadingSet`]
//!
//! [`UnhandledCodeReporter`] runs beside the pipeline and lists the codes the
//! [`Registry`] does not know about. [`MeterReader`] ties all of it together
//! for one read cycle.

pub mod filter;
pub mod framer;
pub mod mapper;
pub mod parser;
pub mod reader;
pub mod reading;
pub mod registry;
pub mod reporter;
pub mod statistics;

pub use filter::{ZeroValueFilter, ALTERNATE_MARKER};
pub use framer::{Telegram, TelegramFramer, DEVICE_SIGNATURE, TERMINATOR};
pub use mapper::SemanticMapper;
pub use parser::{ObisRecordParser, RawRecord};
pub use reader::MeterReader;
pub use reading::{Reading, ReadingSet};
pub use registry::{Registry, RegistryEntry};
pub use reporter::UnhandledCodeReporter;
pub use statistics::FramerStatistics;
