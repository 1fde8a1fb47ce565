use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::capture::domain::frame_source::FrameSource;
use crate::classification::domain::emotion_classifier::EmotionClassifier;
use crate::detection::domain::face_locator::FaceLocator;
use crate::display::domain::frame_display::FrameDisplay;
use crate::shared::face_report::FaceReport;
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::signal::domain::arming_gate::{gate, ArmingGate};
use crate::signal::domain::emotion_mapper::signal_code;
use crate::signal::domain::signal_reporter::SignalReporter;

use super::pipeline_logger::PipelineLogger;

#[derive(Error, Debug)]
pub enum FrameProcessingError {
    #[error("face region {region:?} lies outside the {width}x{height} frame")]
    RegionExtraction {
        region: Region,
        width: u32,
        height: u32,
    },
}

/// Loop behaviour fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Hand the classifier the luminance crop replicated to RGB.
    pub grayscale_faces: bool,
    /// Stop after this many processed frames.
    pub max_frames: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            grayscale_faces: true,
            max_frames: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The operator pressed the quit key.
    Operator,
    /// The shared cancellation flag was raised.
    Cancelled,
    FrameLimit,
    /// The frame source can no longer deliver frames.
    SourceExhausted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames_processed: usize,
    pub frames_absent: usize,
    pub frames_aborted: usize,
    pub faces_located: usize,
    pub classification_failures: usize,
    pub reports_dispatched: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub stats: RunStats,
    pub stop: StopReason,
}

/// Drives acquire → locate → (classify → map → gate → report per face) →
/// render, one frame at a time, until told to stop.
///
/// Failures are contained where they happen: a classifier error skips
/// one face, a region that cannot be extracted abandons the rest of that
/// frame, an absent frame skips the iteration. Only an exhausted source
/// ends the loop on its own.
pub struct EmotionSignalUseCase {
    source: Box<dyn FrameSource>,
    locator: Box<dyn FaceLocator>,
    classifier: Box<dyn EmotionClassifier>,
    gate: Box<dyn ArmingGate>,
    reporter: Box<dyn SignalReporter>,
    display: Box<dyn FrameDisplay>,
    logger: Box<dyn PipelineLogger>,
    settings: PipelineSettings,
    cancelled: Arc<AtomicBool>,
    stats: RunStats,
}

impl EmotionSignalUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        locator: Box<dyn FaceLocator>,
        classifier: Box<dyn EmotionClassifier>,
        gate: Box<dyn ArmingGate>,
        reporter: Box<dyn SignalReporter>,
        display: Box<dyn FrameDisplay>,
        logger: Box<dyn PipelineLogger>,
        settings: PipelineSettings,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source,
            locator,
            classifier,
            gate,
            reporter,
            display,
            logger,
            settings,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Runs until the operator stops it, the flag is raised, the frame
    /// limit is hit or the source is exhausted.
    pub fn run(&mut self) -> RunOutcome {
        self.logger.info("Pipeline started");
        let stop = loop {
            if self.cancelled.load(Ordering::Relaxed) {
                break StopReason::Cancelled;
            }
            if self
                .settings
                .max_frames
                .is_some_and(|limit| self.stats.frames_processed >= limit)
            {
                break StopReason::FrameLimit;
            }
            if let Some(reason) = self.step() {
                break reason;
            }
        };
        self.logger.info(&format!("Pipeline stopped: {stop:?}"));
        self.logger.summary();
        RunOutcome {
            stats: self.stats.clone(),
            stop,
        }
    }

    /// One iteration. Returns the reason to stop, if any.
    pub fn step(&mut self) -> Option<StopReason> {
        let started = Instant::now();
        let frame = match self.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.stats.frames_absent += 1;
                return None;
            }
            Err(e) => {
                log::error!("Frame acquisition failed: {e}");
                return Some(StopReason::SourceExhausted);
            }
        };
        self.logger.timing("acquire", elapsed_ms(started));

        // Faces reported before an abort stay on the overlay.
        let mut faces = Vec::new();
        if let Err(e) = self.report_faces(&frame, &mut faces) {
            log::warn!("Error in processing frame {}: {e}", frame.index());
            self.stats.frames_aborted += 1;
        }
        self.stats.frames_processed += 1;
        self.logger.progress(self.stats.frames_processed);

        let started = Instant::now();
        if let Err(e) = self.display.render(&frame, &faces) {
            log::warn!("Failed to render frame {}: {e}", frame.index());
        }
        self.logger.timing("render", elapsed_ms(started));

        if self.display.stop_requested() {
            return Some(StopReason::Operator);
        }
        None
    }

    /// Locates faces in `frame` and reports one code per classified face.
    ///
    /// Returns what was reported, in locator order.
    pub fn process_frame(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceReport>, FrameProcessingError> {
        let mut reports = Vec::new();
        self.report_faces(frame, &mut reports)?;
        Ok(reports)
    }

    /// Appends one entry to `reports` per dispatched face. On error the
    /// entries pushed so far are left in place.
    fn report_faces(
        &mut self,
        frame: &Frame,
        reports: &mut Vec<FaceReport>,
    ) -> Result<(), FrameProcessingError> {
        let started = Instant::now();
        let regions = self.locator.locate(frame);
        self.logger.timing("locate", elapsed_ms(started));
        self.logger.metric("faces", regions.len() as f64);
        self.stats.faces_located += regions.len();

        if regions.is_empty() {
            return Ok(());
        }

        let pixels: Cow<'_, Frame> = if self.settings.grayscale_faces {
            Cow::Owned(frame.luma_as_rgb())
        } else {
            Cow::Borrowed(frame)
        };

        reports.reserve(regions.len());
        for region in regions {
            let face = pixels
                .crop(&region)
                .ok_or(FrameProcessingError::RegionExtraction {
                    region,
                    width: frame.width(),
                    height: frame.height(),
                })?;

            let started = Instant::now();
            let classified = self.classifier.classify(&face);
            self.logger.timing("classify", elapsed_ms(started));
            let label = match classified {
                Ok(label) => label,
                Err(e) => {
                    log::warn!("Error in emotion analysis: {e}");
                    self.stats.classification_failures += 1;
                    continue;
                }
            };

            let armed = self.gate.is_armed(frame);
            let code = gate(armed, signal_code(&label));
            log::info!(
                "Face at ({}, {}): {label} -> signal {code}{}",
                region.x,
                region.y,
                if armed { "" } else { " (disarmed)" }
            );

            let started = Instant::now();
            self.reporter.report(code);
            self.logger.timing("report", elapsed_ms(started));
            self.stats.reports_dispatched += 1;

            reports.push(FaceReport {
                region,
                label,
                code,
            });
        }
        Ok(())
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
