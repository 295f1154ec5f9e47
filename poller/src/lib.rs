//! World clock poller.
//!
//! Asks the clock server for the current time on a fixed timer and keeps a
//! display target showing `The time is currently {time}.`. Each tick is an
//! independent request; failures are logged and the next tick tries again.

pub mod display;
pub mod poller;
pub mod source;

pub use display::{DisplayError, DisplayTarget, FileDisplay, MemoryDisplay, TerminalDisplay};
pub use poller::{format_message, Poller};
pub use source::{HttpTimeSource, RequestFailure, SourceError, TimeSource};
