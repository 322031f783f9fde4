//! Error types and context management for inpainting operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all inpainting operations
#[derive(Debug)]
pub enum InpaintError {
    /// Failed to load an image or mask from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// A patch would extend past the grid
    ///
    /// Raised at construction time. Callers either skip the vertex or
    /// choose a smaller half-width.
    OutOfBounds {
        /// Requested patch center as `[row, col]`
        center: [usize; 2],
        /// Requested half-width
        half_width: usize,
        /// Grid dimensions as `(rows, cols)`
        bounds: (usize, usize),
    },

    /// A patch that must be fully valid touches a hole pixel
    ///
    /// Indicates a bookkeeping bug in the source patch collection.
    IncompletePatch {
        /// Center of the offending patch
        center: [usize; 2],
        /// Half-width of the offending patch
        half_width: usize,
        /// First hole pixel found inside the patch
        hole: [usize; 2],
    },

    /// Two patches or descriptors that must agree in size do not
    SizeMismatch {
        /// Size of the source side (side length or component count)
        source: usize,
        /// Size of the target side
        target: usize,
    },

    /// The run ended with hole pixels left that no admissible match could fill
    InpaintingIncomplete {
        /// Hole pixels remaining at termination
        remaining: Vec<[usize; 2]>,
        /// Number of patches committed before termination
        commits: usize,
    },

    /// The incremental frontier disagrees with a brute-force recomputation
    FrontierMismatch {
        /// Boundary vertices the frontier does not track
        missing: Vec<[usize; 2]>,
        /// Tracked vertices that are not on the boundary
        unexpected: Vec<[usize; 2]>,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Failed to save an image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for InpaintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::OutOfBounds {
                center,
                half_width,
                bounds,
            } => {
                write!(
                    f,
                    "Patch at [{}, {}] with half-width {half_width} exceeds grid {}x{}",
                    center[0], center[1], bounds.0, bounds.1
                )
            }
            Self::IncompletePatch {
                center,
                half_width,
                hole,
            } => {
                write!(
                    f,
                    "Source patch at [{}, {}] (half-width {half_width}) contains hole pixel [{}, {}]",
                    center[0], center[1], hole[0], hole[1]
                )
            }
            Self::SizeMismatch { source, target } => {
                write!(f, "Size mismatch: source {source}, target {target}")
            }
            Self::InpaintingIncomplete { remaining, commits } => {
                write!(
                    f,
                    "Inpainting incomplete: {} hole pixels remain after {commits} commits",
                    remaining.len()
                )?;
                if let Some(first) = remaining.first() {
                    write!(f, " (first at [{}, {}])", first[0], first[1])?;
                }
                Ok(())
            }
            Self::FrontierMismatch {
                missing,
                unexpected,
            } => {
                write!(
                    f,
                    "Frontier out of sync: {} boundary vertices missing, {} unexpected",
                    missing.len(),
                    unexpected.len()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for InpaintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for inpainting results
pub type Result<T> = std::result::Result<T, InpaintError>;

/// Additional context to enrich error messages
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Current driver iteration
    pub iteration: Option<usize>,
    /// Commits performed so far
    pub commits: Option<usize>,
    /// Vertex being processed when the error occurred
    pub vertex: Option<[usize; 2]>,
    /// Operation being performed
    pub operation: Option<&'static str>,
}

/// Enriches error messages with driver state information
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Add just the operation context
    ///
    /// # Errors
    ///
    /// Propagates the original error with the operation context applied
    fn with_operation(self, operation: &'static str) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<InpaintError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only the terminal report carries a commit counter worth patching
            if let InpaintError::InpaintingIncomplete { commits, .. } = &mut error {
                if let Some(count) = context.commits {
                    *commits = count;
                }
            }
            error
        })
    }

    fn with_operation(self, operation: &'static str) -> Result<T> {
        self.with_context(ErrorContext {
            operation: Some(operation),
            ..Default::default()
        })
    }
}

impl From<image::ImageError> for InpaintError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for InpaintError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> InpaintError {
    InpaintError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
