//! Services separating I/O and progress concerns from pipeline logic

pub mod io;
pub mod progress;

pub use io::ImageIOService;
pub use progress::{
    BatchProgressUpdate, ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage,
    ProgressReporter,
};
