//! Frame capture and GIF generation for fill visualization

use crate::io::configuration::{HOLE_COLOR, VIEWER_MIN_FRAME_DELAY_MS};
use crate::io::error::{InpaintError, Result, invalid_parameter};
use crate::io::image::pixel_to_rgb;
use crate::io::progress::{CommitEvent, ProgressSink};
use crate::spatial::grid::{ImageGrid, Mask};
use crate::spatial::patch::Vertex;
use image::{Frame, Rgba, RgbaImage};
use std::path::Path;

/// Pixels written by a single commit
#[derive(Debug, Clone)]
pub struct CommitStroke {
    /// Driver iteration of the commit
    pub iteration: usize,
    /// Filled vertices with their new colors
    pub pixels: Vec<(Vertex, [u8; 4])>,
}

/// Records every commit to replay the fill as an animation
///
/// Only the starting image and the filled pixels of each commit are kept;
/// frames are rendered at export time.
pub struct VisualizationCapture {
    initial: RgbaImage,
    strokes: Vec<CommitStroke>,
}

impl VisualizationCapture {
    /// Start a capture from the image and mask before any fill
    ///
    /// Hole pixels are painted with `HOLE_COLOR`.
    pub fn new(image: &ImageGrid, mask: &Mask) -> Self {
        let mut initial = RgbaImage::new(image.cols() as u32, image.rows() as u32);
        for row in 0..image.rows() {
            for col in 0..image.cols() {
                let color = if mask.is_hole([row, col]) {
                    HOLE_COLOR
                } else {
                    rgba_at(image, [row, col])
                };
                initial.put_pixel(col as u32, row as u32, Rgba(color));
            }
        }
        Self {
            initial,
            strokes: Vec::new(),
        }
    }

    /// Record the pixels written by a commit
    pub fn record_commit(&mut self, iteration: usize, image: &ImageGrid, filled: &[Vertex]) {
        self.strokes.push(CommitStroke {
            iteration,
            pixels: filled.iter().map(|&v| (v, rgba_at(image, v))).collect(),
        });
    }

    /// All recorded commits
    pub fn strokes(&self) -> &[CommitStroke] {
        &self.strokes
    }

    /// Number of recorded commits
    pub const fn commit_count(&self) -> usize {
        self.strokes.len()
    }

    /// Export the captured frames as a GIF with automatic frame skipping
    ///
    /// If `frame_delay_ms` is shorter than viewers support, commits are
    /// grouped so the animation keeps its apparent speed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No commits were captured
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif(&self, output_path: &Path, frame_delay_ms: u32) -> Result<()> {
        if self.strokes.is_empty() {
            return Err(invalid_parameter(
                "visualization",
                &0,
                &"no commits captured for visualization",
            ));
        }

        let frame_delay_ms = frame_delay_ms.max(1);
        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms)
        } else {
            1
        };

        let frames = self.generate_frames(effective_delay_ms, skip_factor as usize);

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| InpaintError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let file = std::fs::File::create(output_path).map_err(|e| InpaintError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| InpaintError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn generate_frames(&self, delay_ms: u32, skip_factor: usize) -> Vec<Frame> {
        let mut canvas = self.initial.clone();
        let mut frames = vec![render_frame(&canvas, delay_ms)];

        for (index, stroke) in self.strokes.iter().enumerate() {
            for &([row, col], color) in &stroke.pixels {
                if let Some(pixel) = canvas.get_pixel_mut_checked(col as u32, row as u32) {
                    *pixel = Rgba(color);
                }
            }
            if (index + 1) % skip_factor == 0 {
                frames.push(render_frame(&canvas, delay_ms));
            }
        }

        if self.strokes.len() % skip_factor != 0 {
            frames.push(render_frame(&canvas, delay_ms));
        }

        // Final frame displays longer for better visibility
        frames.push(render_frame(&canvas, delay_ms * 25));
        frames
    }
}

impl ProgressSink for VisualizationCapture {
    fn on_commit(&mut self, event: &CommitEvent<'_>) {
        self.record_commit(event.iteration, event.image, event.filled);
    }
}

fn rgba_at(image: &ImageGrid, vertex: Vertex) -> [u8; 4] {
    image.pixel(vertex).map_or([0, 0, 0, 255], |p| {
        let [r, g, b] = pixel_to_rgb(p);
        [r, g, b, 255]
    })
}

fn render_frame(canvas: &RgbaImage, delay_ms: u32) -> Frame {
    Frame::from_parts(
        canvas.clone(),
        0,
        0,
        image::Delay::from_numer_denom_ms(delay_ms, 1),
    )
}
