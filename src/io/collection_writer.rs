use crate::pdbs::PatternCollectionInformation;
use anyhow::{Context, Result};
use std::io::Write;

/// A writer for pattern collections.
///
/// A collection is written as one line per pattern, each line being the
/// letter `p` followed by the variable ids of the pattern in ascending
/// order.
#[derive(Default)]
pub struct PatternCollectionWriter;

impl PatternCollectionWriter {
    /// Writes the patterns of a collection.
    pub fn write(
        &self,
        writer: &mut dyn Write,
        collection: &PatternCollectionInformation,
    ) -> Result<()> {
        let context = "while writing a pattern collection";
        for pattern in collection.patterns() {
            let vars = pattern
                .variables()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>();
            writeln!(writer, "p {}", vars.join(" ")).context(context)?;
        }
        writer.flush().context(context)
    }
}
