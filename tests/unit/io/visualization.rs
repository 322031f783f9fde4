//! Tests for fill visualization capture and GIF export

#[cfg(test)]
mod tests {
    use patchfill::InpaintError;
    use patchfill::io::configuration::HOLE_COLOR;
    use patchfill::io::visualization::VisualizationCapture;
    use patchfill::spatial::grid::{ImageGrid, Mask};

    fn setup() -> (ImageGrid, Mask) {
        let image = ImageGrid::filled(6, 6, &[10.0, 20.0, 30.0]).expect("valid image");
        let mut mask = Mask::new(6, 6);
        mask.set_hole([2, 2]);
        mask.set_hole([2, 3]);
        (image, mask)
    }

    // Tests a new capture has no commits
    // Verified by recording the initial frame as a commit
    #[test]
    fn test_visualization_capture_new() {
        let (image, mask) = setup();
        let viz = VisualizationCapture::new(&image, &mask);
        assert_eq!(viz.commit_count(), 0);
        assert!(viz.strokes().is_empty());
    }

    // Tests commit recording stores the filled pixels with their colors
    // Verified by storing the hole color for filled pixels
    #[test]
    fn test_record_commit() {
        let (image, mask) = setup();
        let mut viz = VisualizationCapture::new(&image, &mask);

        viz.record_commit(3, &image, &[[2, 2], [2, 3]]);
        assert_eq!(viz.commit_count(), 1);

        let stroke = viz.strokes().first().expect("one stroke");
        assert_eq!(stroke.iteration, 3);
        assert_eq!(stroke.pixels.len(), 2);
        assert!(stroke.pixels.iter().all(|(_, color)| *color == [10, 20, 30, 255]));
        assert_ne!(HOLE_COLOR, [10, 20, 30, 255]);
    }

    // Tests error when exporting empty visualization
    // Verified by removing empty strokes check
    #[test]
    fn test_export_gif_no_commits() {
        let (image, mask) = setup();
        let viz = VisualizationCapture::new(&image, &mask);
        let dir = tempfile::tempdir().expect("temp dir");

        let result = viz.export_gif(&dir.path().join("empty.gif"), 50);
        assert!(matches!(result, Err(InpaintError::InvalidParameter { .. })));
    }

    // Tests GIF export writes a decodable file
    // Verified by skipping the encoder
    #[test]
    fn test_export_gif_writes_file() {
        let (image, mask) = setup();
        let mut viz = VisualizationCapture::new(&image, &mask);
        for iteration in 1..=5 {
            viz.record_commit(iteration, &image, &[[2, 2]]);
        }

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("viz").join("fill.gif");
        viz.export_gif(&path, 10).expect("export succeeds");

        let decoded = image::open(&path).expect("valid gif");
        assert_eq!(decoded.width(), 6);
        assert_eq!(decoded.height(), 6);
    }

    // Tests export into an unwritable location fails
    // Verified by ignoring file creation errors
    #[test]
    fn test_export_gif_bad_path() {
        let (image, mask) = setup();
        let mut viz = VisualizationCapture::new(&image, &mask);
        viz.record_commit(1, &image, &[[2, 2]]);

        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").expect("write blocker");

        let result = viz.export_gif(&blocker.join("out.gif"), 50);
        assert!(matches!(result, Err(InpaintError::FileSystem { .. })));
    }
}
