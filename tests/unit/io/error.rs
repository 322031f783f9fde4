//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use patchfill::InpaintError;
    use patchfill::io::error::{ErrorContext, WithContext, invalid_parameter};
    use std::error::Error;
    use std::path::PathBuf;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = InpaintError::FileSystem {
            path: "/tmp/test.png".into(),
            operation: "read",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(error.to_string().contains("read"));
    }

    // Tests OutOfBounds formatting names the patch and the grid
    // Verified by omitting the grid dimensions from the message
    #[test]
    fn test_out_of_bounds_message() {
        let error = InpaintError::OutOfBounds {
            center: [1, 2],
            half_width: 3,
            bounds: (10, 20),
        };

        let message = error.to_string();
        assert!(message.contains("[1, 2]"));
        assert!(message.contains("half-width 3"));
        assert!(message.contains("10x20"));
        assert!(error.source().is_none());
    }

    // Tests IncompletePatch formatting names the hole pixel
    // Verified by printing the center twice
    #[test]
    fn test_incomplete_patch_message() {
        let error = InpaintError::IncompletePatch {
            center: [4, 4],
            half_width: 1,
            hole: [5, 3],
        };
        assert!(error.to_string().contains("[5, 3]"));
    }

    // Tests InpaintingIncomplete reports the count and first remaining hole
    // Verified by dropping the first-hole suffix
    #[test]
    fn test_incomplete_message() {
        let error = InpaintError::InpaintingIncomplete {
            remaining: vec![[7, 8], [7, 9]],
            commits: 12,
        };

        let message = error.to_string();
        assert!(message.contains("2 hole pixels"));
        assert!(message.contains("12 commits"));
        assert!(message.contains("[7, 8]"));
    }

    // Tests FrontierMismatch counts both sides
    // Verified by swapping the missing and unexpected counts
    #[test]
    fn test_frontier_mismatch_message() {
        let error = InpaintError::FrontierMismatch {
            missing: vec![[0, 0]],
            unexpected: vec![[1, 1], [2, 2]],
        };
        let message = error.to_string();
        assert!(message.contains("1 boundary vertices missing"));
        assert!(message.contains("2 unexpected"));
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("half-width", &-1, &"must be positive");

        let message = error.to_string();
        assert!(message.contains("half-width"));
        assert!(message.contains("-1"));
        assert!(message.contains("must be positive"));
    }

    // Tests ImageExport error with IO source
    // Verified by excluding source error from message
    #[test]
    fn test_image_export_error() {
        let image_error = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));

        let error = InpaintError::ImageExport {
            path: PathBuf::from("/restricted/output.png"),
            source: image_error,
        };

        let message = error.to_string();
        assert!(message.contains("/restricted/output.png"));
        assert!(error.source().is_some());
        assert!(
            message.contains("access denied"),
            "Error message should include source error details: {message}"
        );
    }

    // Tests context patches the commit counter of a terminal report
    // Verified by ignoring the context in with_context
    #[test]
    fn test_with_context_commits() {
        let result: Result<(), InpaintError> = Err(InpaintError::InpaintingIncomplete {
            remaining: vec![[1, 1]],
            commits: 0,
        });
        let context = ErrorContext {
            commits: Some(5),
            ..Default::default()
        };

        match result.with_context(context) {
            Err(InpaintError::InpaintingIncomplete { commits, .. }) => assert_eq!(commits, 5),
            other => unreachable!("expected InpaintingIncomplete, got {other:?}"),
        }
    }

    // Tests operation context leaves other errors unchanged
    // Verified by converting every error into InvalidParameter
    #[test]
    fn test_with_operation_passthrough() {
        let result: Result<(), InpaintError> = Err(InpaintError::SizeMismatch {
            source: 3,
            target: 5,
        });
        assert!(matches!(
            result.with_operation("search"),
            Err(InpaintError::SizeMismatch {
                source: 3,
                target: 5
            })
        ));
    }

    // Tests conversions from library errors
    // Verified by mapping io errors to ImageLoad
    #[test]
    fn test_from_conversions() {
        let io = std::io::Error::other("boom");
        assert!(matches!(
            InpaintError::from(io),
            InpaintError::FileSystem { .. }
        ));

        let image_error = image::ImageError::IoError(std::io::Error::other("bad"));
        assert!(matches!(
            InpaintError::from(image_error),
            InpaintError::ImageLoad { .. }
        ));
    }
}
