use quick_error::quick_error;
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum BrainviewError {
        /// Invalid argument: bad percentiles, unknown colormap, unsupported export format, malformed mesh.
        InvalidArgument(msg: String) {
            display("Invalid argument: {}", msg)
        }

        /// The requested configuration file does not exist.
        ConfigFileMissing(path: PathBuf) {
            display("Config file '{}' does not exist. Must be a readable file in INI format.", path.display())
        }

        /// The configuration file could not be parsed, or holds a malformed value.
        InvalidConfig(path: PathBuf, msg: String) {
            display("Invalid config file '{}': {}", path.display(), msg)
        }

        /// I/O Error, with the path it occurred on.
        Io(path: PathBuf, err: IOError) {
            display("I/O error on '{}': {}", path.display(), err)
            source(err)
        }
    }
}

impl BrainviewError {
    pub(crate) fn invalid_argument<S: Into<String>>(msg: S) -> BrainviewError {
        BrainviewError::InvalidArgument(msg.into())
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, BrainviewError>;
