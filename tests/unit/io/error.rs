//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use seamclone::CloneError;
    use seamclone::io::error::{computation_error, invalid_parameter};
    use std::error::Error;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = CloneError::FileSystem {
            path: "/tmp/target.png".into(),
            operation: "read",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(error.to_string().contains("/tmp/target.png"));
    }

    // Tests bounds violations report placement and target size
    // Verified by omitting the target size from the message
    #[test]
    fn test_out_of_bounds_message() {
        let error = CloneError::OutOfBounds {
            region: (3, 4, 10, 20),
            target: (12, 30),
        };

        let message = error.to_string();
        assert!(message.contains("10x20"));
        assert!(message.contains("(3, 4)"));
        assert!(message.contains("12x30"));
        assert!(error.source().is_none());
    }

    // Tests non-convergence names the channel and iteration count
    // Verified by omitting the channel from the message
    #[test]
    fn test_non_convergence_message() {
        let error = CloneError::NonConvergence {
            channel: 2,
            iterations: 1000,
            relative_residual: 3.5e-3,
        };

        let message = error.to_string();
        assert!(message.contains("channel 2"));
        assert!(message.contains("1000 iterations"));
        assert!(message.contains("3.500e-3"));
    }

    // Tests non-finite input and channel mismatch messages
    // Verified by swapping the reported image names
    #[test]
    fn test_input_errors() {
        let non_finite = CloneError::NonFiniteInput {
            image: "target",
            row: 7,
            col: 9,
        };
        assert!(non_finite.to_string().contains("target at (7, 9)"));

        let mismatch = CloneError::ChannelMismatch {
            target: 3,
            source: 1,
        };
        let message = mismatch.to_string();
        assert!(message.contains("target has 3"));
        assert!(message.contains("source has 1"));
    }

    // Tests helper constructors fill every field
    // Verified by dropping the reason in the helper
    #[test]
    fn test_error_helpers() {
        let error = invalid_parameter("tolerance", &-1.0, &"must be a positive finite number");
        let message = error.to_string();
        assert!(message.contains("tolerance"));
        assert!(message.contains("-1"));
        assert!(message.contains("must be a positive finite number"));

        let error = computation_error("conjugate gradient", &"curvature 0e0");
        assert!(matches!(
            error,
            CloneError::Computation {
                operation: "conjugate gradient",
                ..
            }
        ));
        assert!(error.to_string().contains("curvature 0e0"));
    }

    // Tests conversions from foreign errors
    // Verified by mapping shape errors to file system errors
    #[test]
    fn test_error_conversions() {
        let shape = ndarray::Array2::<f64>::from_shape_vec((2, 2), vec![1.0]);
        let error = CloneError::from(shape.expect_err("Shape mismatch"));
        assert!(matches!(
            error,
            CloneError::Computation {
                operation: "reshape",
                ..
            }
        ));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = CloneError::from(io);
        assert!(matches!(error, CloneError::FileSystem { .. }));
        assert!(error.source().is_some());
    }

    // Tests ImageExport error with IO source
    // Verified by excluding source error from message
    #[test]
    fn test_image_export_error() {
        let image_error = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));
        let error = CloneError::ImageExport {
            path: "/restricted/output.png".into(),
            source: image_error,
        };

        let message = error.to_string();
        assert!(message.contains("/restricted/output.png"));
        assert!(message.contains("access denied"));
        assert!(error.source().is_some());
    }
}
