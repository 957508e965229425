//! Objects used to read planning tasks and write pattern collections.

mod collection_writer;
pub use collection_writer::PatternCollectionWriter;

mod specs;
pub use specs::InstanceReader;
pub use specs::WarningHandler;

mod task_reader;
pub use task_reader::TaskReader;
