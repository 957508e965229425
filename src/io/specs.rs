use crate::planning::Task;
use anyhow::Result;
use std::io::Read;

/// The type of callback functions to call when warnings are raised while parsing a task.
///
/// Such callback functions take as input the line number and the warning message.
pub type WarningHandler = Box<dyn Fn(usize, String)>;

/// A trait implemented by objects able to read planning tasks.
///
/// They must detect errors encountered while reading a task and can also
/// raise warnings using the ones registered through the
/// [add_warning_handler](Self::add_warning_handler) function.
pub trait InstanceReader {
    /// Reads a [Task].
    ///
    /// In case warnings are raised, the callback functions registered by
    /// [add_warning_handler](Self::add_warning_handler) are triggered.
    ///
    /// # Example
    ///
    /// ```
    /// # use rupaco::io::{InstanceReader, TaskReader};
    /// # use rupaco::planning::Task;
    /// fn read_task_from_str(s: &str) -> Task {
    ///     let reader = TaskReader::default();
    ///     reader.read(&mut s.as_bytes()).expect("invalid task")
    /// }
    /// # read_task_from_str("p task 1\nv 2\ni 0\ng 0 1\no 1\ne 0 1\n");
    /// ```
    fn read(&self, reader: &mut dyn Read) -> Result<Task>;

    /// Adds a callback function to call when warnings are raised while parsing a task.
    ///
    /// Such callback functions take as input the line number and the warning message.
    fn add_warning_handler(&mut self, h: WarningHandler);
}
