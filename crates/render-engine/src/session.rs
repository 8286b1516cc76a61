//! Overlay session management: the render loop and its state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use fitmirror_capture_engine::VideoSource;
use fitmirror_common::clock::{RateController, SessionClock};
use fitmirror_common::error::{FitmirrorError, FitmirrorResult};
use fitmirror_overlay_core::anchor::{compute_anchor, AnchorCalibration};
use fitmirror_overlay_core::garment::SpriteCache;
use fitmirror_overlay_model::{AnchorRect, Frame, GarmentSprite, OverlayState};
use fitmirror_pose_estimator::{PoseEstimator, PoseLoader};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::compositor::composite_sprite;
use crate::sink::{encode_png, FrameSink};

/// Configuration for an overlay session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Render loop tick rate (Hz).
    pub refresh_hz: u32,

    /// Garment compositing opacity, `0.0..=1.0`.
    pub opacity: f32,

    /// Anchor calibration constants.
    pub calibration: AnchorCalibration,

    /// What to do on a tick with no usable pose.
    pub missing_pose: MissingPosePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_hz: 60,
            opacity: 0.88,
            calibration: AnchorCalibration::default(),
            missing_pose: MissingPosePolicy::Skip,
        }
    }
}

/// Behavior on a tick where no usable anchor could be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPosePolicy {
    /// Present the base frame without a garment this tick.
    Skip,
    /// Reuse the last known anchor until detection recovers.
    Freeze,
}

impl std::str::FromStr for MissingPosePolicy {
    type Err = FitmirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "freeze" => Ok(Self::Freeze),
            other => Err(FitmirrorError::config(format!(
                "Unknown missing-pose policy '{other}' (expected 'skip' or 'freeze')"
            ))),
        }
    }
}

/// State of an overlay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, not yet given a live video source.
    Idle,
    /// Video source attached; pose estimator handle being resolved.
    Initializing,
    /// Live: detect, anchor, composite, present.
    Running,
    /// Live video without compositing (pose estimator unavailable).
    RunningWithoutOverlay,
    /// Deactivated; no further source reads or detect calls occur.
    Stopped,
}

/// Counters accumulated by the render loop, returned from `stop`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickStats {
    /// Frames pulled from the video source.
    pub frames_read: u64,
    /// Frames handed to the sink.
    pub frames_presented: u64,
    /// Frames that included a composited garment.
    pub frames_composited: u64,
    /// Pose detection invocations.
    pub detect_calls: u64,
}

/// Shared state between the session handle and the loop thread.
struct Shared {
    state: Mutex<SessionState>,
    overlay: Mutex<OverlayShared>,
}

struct OverlayShared {
    overlay: OverlayState,
    /// Current sprite; swapped atomically, read once per tick.
    sprite: Option<Arc<GarmentSprite>>,
    /// The last fully-composited frame handed to the sink.
    last_presented: Option<Frame>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Idle),
            overlay: Mutex::new(OverlayShared {
                overlay: OverlayState::default(),
                sprite: None,
                last_presented: None,
            }),
        }
    }

    fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    fn set_state(&self, state: SessionState) {
        *lock(&self.state) = state;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A live garment-overlay session.
///
/// State machine: `Idle → Initializing → Running` (or
/// `RunningWithoutOverlay` when the pose estimator fails terminally)
/// `→ Stopped`. The loop runs on a blocking thread; UI-driven calls
/// (garment switch, stop, still capture) come from the async side and
/// only ever touch atomically-swapped shared state.
pub struct OverlaySession {
    config: SessionConfig,
    loader: Arc<PoseLoader>,
    shared: Arc<Shared>,
    cache: Mutex<SpriteCache>,
    stop_flag: Arc<AtomicBool>,
    loop_task: Option<tokio::task::JoinHandle<FitmirrorResult<TickStats>>>,
}

impl OverlaySession {
    /// Create an idle session with the given pose loader.
    pub fn new(config: SessionConfig, loader: Arc<PoseLoader>) -> Self {
        Self {
            config,
            loader,
            shared: Arc::new(Shared::new()),
            cache: Mutex::new(SpriteCache::new()),
            stop_flag: Arc::new(AtomicBool::new(false)),
            loop_task: None,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Attach a video source and start the render loop.
    ///
    /// Resolves the pose estimator handle first (`Initializing`); a
    /// terminal pose failure degrades to `RunningWithoutOverlay` rather
    /// than failing the session; the base video is still presented.
    pub async fn start(
        &mut self,
        source: Box<dyn VideoSource>,
        sink: Box<dyn FrameSink>,
    ) -> FitmirrorResult<()> {
        if self.shared.state() != SessionState::Idle {
            return Err(FitmirrorError::render("Session already started"));
        }

        tracing::info!(source = source.name(), "Starting overlay session");
        self.shared.set_state(SessionState::Initializing);
        lock(&self.shared.overlay).overlay.active = true;

        let pose = match self.loader.initialize().await {
            Ok(handle) => {
                self.shared.set_state(SessionState::Running);
                Some(handle)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Pose estimator unavailable; running without overlay");
                self.shared.set_state(SessionState::RunningWithoutOverlay);
                None
            }
        };

        self.stop_flag.store(false, Ordering::SeqCst);
        let shared = self.shared.clone();
        let stop_flag = self.stop_flag.clone();
        let config = self.config.clone();
        self.loop_task = Some(tokio::task::spawn_blocking(move || {
            run_loop(source, sink, pose, shared, stop_flag, config)
        }));

        Ok(())
    }

    /// Stop the session and tear down overlay state.
    ///
    /// Sets the stop flag (checked at the top of every tick, before any
    /// source or pose access) and joins the loop. When this returns, no
    /// further `detect` calls or source reads can occur.
    pub async fn stop(&mut self) -> FitmirrorResult<TickStats> {
        let Some(task) = self.loop_task.take() else {
            return Err(FitmirrorError::render("Session not running"));
        };

        self.stop_flag.store(true, Ordering::SeqCst);
        let result = task
            .await
            .map_err(|e| FitmirrorError::render(format!("Overlay loop join failed: {e}")))?;

        // Teardown happens whether the loop ended cleanly or not.
        {
            let mut guard = lock(&self.shared.overlay);
            guard.overlay.reset();
            guard.sprite = None;
            guard.last_presented = None;
        }
        lock(&self.cache).clear();
        self.shared.set_state(SessionState::Stopped);

        let stats = result?;

        tracing::info!(
            frames = stats.frames_presented,
            composited = stats.frames_composited,
            detects = stats.detect_calls,
            "Overlay session stopped"
        );
        Ok(stats)
    }

    /// Select the active garment from a decoded product image.
    ///
    /// The matte runs once per distinct key (cached); the sprite reference
    /// is swapped atomically, so the loop keeps running and simply reads
    /// the new sprite on its next tick.
    pub fn set_garment(&self, key: &str, source: &RgbaImage) {
        let sprite = lock(&self.cache).get_or_process(key, source);
        let mut guard = lock(&self.shared.overlay);
        guard.overlay.current_garment_key = Some(key.to_string());
        guard.sprite = Some(sprite);
        tracing::info!(key, "Garment selected");
    }

    /// Deselect the garment; the loop presents the base feed only.
    pub fn clear_garment(&self) {
        let mut guard = lock(&self.shared.overlay);
        guard.overlay.current_garment_key = None;
        guard.sprite = None;
    }

    /// Identity of the currently selected garment.
    pub fn current_garment(&self) -> Option<String> {
        lock(&self.shared.overlay).overlay.current_garment_key.clone()
    }

    /// The most recent anchor rect, if any.
    pub fn last_anchor(&self) -> Option<AnchorRect> {
        lock(&self.shared.overlay).overlay.last_anchor
    }

    /// PNG-encode the last presented frame for the downstream
    /// garment-transfer request, mirrored and composited exactly as the
    /// live preview showed it.
    pub fn capture_current_frame(&self) -> FitmirrorResult<Vec<u8>> {
        let frame = lock(&self.shared.overlay)
            .last_presented
            .clone()
            .ok_or_else(|| FitmirrorError::render("No frame presented yet"))?;
        encode_png(&frame)
    }
}

impl Drop for OverlaySession {
    fn drop(&mut self) {
        // A dropped session must not leave the loop thread spinning.
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

/// The render loop. One tick at a time, paced to the configured refresh
/// rate; a slow detect call delays the next tick instead of stacking work.
fn run_loop(
    mut source: Box<dyn VideoSource>,
    mut sink: Box<dyn FrameSink>,
    pose: Option<Arc<dyn PoseEstimator>>,
    shared: Arc<Shared>,
    stop_flag: Arc<AtomicBool>,
    config: SessionConfig,
) -> FitmirrorResult<TickStats> {
    let clock = SessionClock::start();
    let mut pacer = RateController::new(config.refresh_hz);
    let mut stats = TickStats::default();

    let outcome = loop {
        // The stop check comes before any work: a stopped session must
        // never touch the source or the pose handle again.
        if stop_flag.load(Ordering::Relaxed) {
            break Ok(());
        }
        if !pacer.should_tick(clock.elapsed_ns()) {
            std::thread::sleep(Duration::from_millis(1));
            continue;
        }

        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::trace!(error = %e, "Frame capture failed; skipping tick");
                continue;
            }
        };
        stats.frames_read += 1;

        let mut canvas = frame.mirrored();
        let sprite = lock(&shared.overlay).sprite.clone();

        if let (Some(pose), Some(sprite)) = (pose.as_ref(), sprite) {
            stats.detect_calls += 1;
            let landmarks = match pose.detect(&frame, frame.timestamp_ms) {
                Ok(landmarks) => landmarks,
                Err(e) => {
                    tracing::trace!(error = %e, "Detection failed this tick");
                    None
                }
            };

            let anchor = landmarks
                .as_ref()
                .and_then(|lm| compute_anchor(lm, frame.width, frame.height, &config.calibration));

            let draw_anchor = {
                let mut guard = lock(&shared.overlay);
                if let Some(ref lm) = landmarks {
                    guard.overlay.last_landmarks = Some(lm.clone());
                }
                match anchor {
                    Some(rect) => {
                        guard.overlay.last_anchor = Some(rect);
                        Some(rect)
                    }
                    None => match config.missing_pose {
                        MissingPosePolicy::Freeze => guard.overlay.last_anchor,
                        MissingPosePolicy::Skip => None,
                    },
                }
            };

            if let Some(rect) = draw_anchor {
                composite_sprite(&mut canvas, &sprite, &rect, config.opacity);
                stats.frames_composited += 1;
            }
        }

        if let Err(e) = sink.present(&canvas) {
            break Err(e);
        }
        lock(&shared.overlay).last_presented = Some(canvas);
        stats.frames_presented += 1;
    };

    lock(&shared.overlay).overlay.active = false;
    shared.set_state(SessionState::Stopped);

    match outcome {
        Ok(()) => Ok(stats),
        Err(e) => {
            tracing::warn!(error = %e, "Overlay loop ended early");
            Err(e)
        }
    }
}
