//! Commit telemetry: progress bars and message-passing sinks

use crate::analysis::pair::PatchPair;
use crate::spatial::grid::{ImageGrid, Mask};
use crate::spatial::patch::{Patch, Vertex};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;
use std::sync::mpsc::Sender;

/// Snapshot passed to sinks after every commit
#[derive(Debug, Clone, Copy)]
pub struct CommitEvent<'a> {
    /// Driver iteration that produced the commit
    pub iteration: usize,
    /// Commits so far, including this one
    pub commits: usize,
    /// Committed source/target pair with its scores
    pub pair: &'a PatchPair,
    /// Vertices that turned from hole to valid
    pub filled: &'a [Vertex],
    /// Holes left after the commit
    pub remaining_holes: usize,
    /// Descriptor image after the commit
    pub image: &'a ImageGrid,
    /// Mask after the commit
    pub mask: &'a Mask,
}

/// Observer notified after every commit
///
/// Sinks run on the engine thread and must return promptly.
pub trait ProgressSink {
    /// Observe one commit
    fn on_commit(&mut self, event: &CommitEvent<'_>);

    /// Observe the end of a run
    fn on_finish(&mut self, _remaining_holes: usize) {}
}

/// Owned copy of a commit, for consumers on other threads
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRecord {
    /// Driver iteration that produced the commit
    pub iteration: usize,
    /// Patch copied from
    pub source: Patch,
    /// Patch copied into
    pub target: Patch,
    /// Vertices that turned from hole to valid
    pub filled: Vec<Vertex>,
    /// Holes left after the commit
    pub remaining_holes: usize,
    /// Combined score of the committed pair, if any was recorded
    pub score: Option<f32>,
}

impl From<&CommitEvent<'_>> for CommitRecord {
    fn from(event: &CommitEvent<'_>) -> Self {
        Self {
            iteration: event.iteration,
            source: *event.pair.source(),
            target: *event.pair.target(),
            filled: event.filled.to_vec(),
            remaining_holes: event.remaining_holes,
            score: event.pair.total_score(),
        }
    }
}

/// Forwards commit records over an unbounded channel
///
/// Sending never blocks; records are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<CommitRecord>,
}

impl ChannelSink {
    /// Wrap the sending half of a channel
    pub const fn new(sender: Sender<CommitRecord>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn on_commit(&mut self, event: &CommitEvent<'_>) {
        let _ = self.sender.send(CommitRecord::from(event));
    }
}

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{prefix} [{bar:30.cyan/blue}] {pos}/{len} pixels {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Terminal progress bar counting filled hole pixels
pub struct ProgressBarSink {
    bar: ProgressBar,
    total: usize,
}

impl ProgressBarSink {
    /// Create a bar for a run starting with `total_holes` hole pixels
    pub fn new(name: &str, total_holes: usize) -> Self {
        let bar = ProgressBar::new(total_holes as u64);
        bar.set_style(PROGRESS_STYLE.clone());
        bar.set_prefix(name.to_string());
        Self {
            bar,
            total: total_holes,
        }
    }

    /// Number of filled pixels currently shown
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressSink for ProgressBarSink {
    fn on_commit(&mut self, event: &CommitEvent<'_>) {
        let filled = self.total.saturating_sub(event.remaining_holes);
        self.bar.set_position(filled as u64);
        self.bar.set_message(format!("({} commits)", event.commits));
    }

    fn on_finish(&mut self, remaining_holes: usize) {
        if remaining_holes == 0 {
            self.bar.finish_with_message("✓");
        } else {
            self.bar
                .abandon_with_message(format!("({remaining_holes} left)"));
        }
    }
}
