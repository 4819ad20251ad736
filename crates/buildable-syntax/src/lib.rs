//! Front-end for `buildable`: parses source files written in the declaration language, runs the
//! registered annotations over them and writes the result back out.

pub mod cli;
pub mod expand;
pub mod parse;
pub mod report;
pub mod source;

pub use expand::{ExpandOptions, Expanded, Stage, expand};
pub use parse::{ParseError, parse};
pub use report::{Report, Reporter};
pub use source::SourceFile;
