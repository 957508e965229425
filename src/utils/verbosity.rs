use anyhow::{anyhow, Result};

/// The verbosity of an algorithm.
///
/// Levels are totally ordered from [Silent](Verbosity::Silent) to
/// [Debug](Verbosity::Debug); an algorithm given a verbosity emits every
/// message whose level is lower than or equal to it.
///
/// # Example
///
/// ```
/// # use rupaco::utils::Verbosity;
/// assert!(Verbosity::Verbose >= Verbosity::Normal);
/// assert_eq!(Verbosity::Debug, Verbosity::try_from("debug").unwrap());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No message at all
    Silent,
    /// The default level: a summary of the main steps
    Normal,
    /// Detailed progress messages
    Verbose,
    /// Everything, including per-iteration internals
    Debug,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Normal
    }
}

impl TryFrom<&str> for Verbosity {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "silent" => Ok(Verbosity::Silent),
            "normal" => Ok(Verbosity::Normal),
            "verbose" => Ok(Verbosity::Verbose),
            "debug" => Ok(Verbosity::Debug),
            _ => Err(anyhow!(r#"undefined verbosity "{}""#, value)),
        }
    }
}
