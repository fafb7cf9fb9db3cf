pub mod reader;

pub use reader::{parse_line, parse_samples, read_samples, ParseSkip, SampleBatch};
