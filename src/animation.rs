//! Spinner animation shown on a button while its request is in flight

use anyhow::{anyhow, Result};
use image::{imageops::FilterType, AnimationDecoder, Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::host::SessionId;
use crate::input::ButtonId;
use crate::tiles::icons::ICON_SIZE;

/// Shortest frame delay honoured (~33 FPS max)
const MIN_FRAME_DELAY: Duration = Duration::from_millis(30);

/// Frames in the generated spinner
const GENERATED_FRAMES: usize = 8;

/// A single frame with its display duration
#[derive(Clone)]
pub struct Frame {
    pub image: Arc<RgbaImage>,
    pub delay: Duration,
}

/// The spinner's image sequence, pre-resized to icon size
#[derive(Clone)]
pub struct SpinnerFrames {
    frames: Vec<Frame>,
}

impl SpinnerFrames {
    /// Decode an animated GIF into frames
    pub fn decode_gif(bytes: &[u8], default_delay: Duration) -> Result<Self> {
        let cursor = std::io::Cursor::new(bytes);
        let decoder = image::codecs::gif::GifDecoder::new(cursor)?;

        let mut frames = Vec::new();
        for frame_result in decoder.into_frames() {
            match frame_result {
                Ok(frame) => {
                    let (numer, denom) = frame.delay().numer_denom_ms();
                    let delay = if numer == 0 {
                        default_delay
                    } else {
                        Duration::from_millis((numer / denom.max(1)) as u64)
                    };
                    let image = image::imageops::resize(
                        &frame.into_buffer(),
                        ICON_SIZE,
                        ICON_SIZE,
                        FilterType::Triangle,
                    );
                    frames.push(Frame {
                        image: Arc::new(image),
                        delay: delay.max(MIN_FRAME_DELAY),
                    });
                }
                Err(e) => {
                    warn!("Failed to decode spinner frame: {}", e);
                    break;
                }
            }
        }

        if frames.is_empty() {
            return Err(anyhow!("spinner GIF has no frames"));
        }
        debug!("Loaded spinner with {} frames", frames.len());
        Ok(Self { frames })
    }

    /// Load the spinner from a GIF file
    pub fn load(path: &Path, default_delay: Duration) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::decode_gif(&bytes, default_delay)
    }

    /// A dot circling the icon square, used when no resource is configured
    pub fn generated(delay: Duration) -> Self {
        let center = ICON_SIZE as f32 / 2.0;
        let orbit = center - 5.0;
        let frames = (0..GENERATED_FRAMES)
            .map(|i| {
                let angle = i as f32 / GENERATED_FRAMES as f32 * std::f32::consts::TAU;
                let (cx, cy) = (center + orbit * angle.cos(), center + orbit * angle.sin());
                let image = RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
                    let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                    if dx * dx + dy * dy <= 9.0 {
                        Rgba([255, 255, 255, 255])
                    } else {
                        Rgba([0, 0, 0, 0])
                    }
                });
                Frame {
                    image: Arc::new(image),
                    delay: delay.max(MIN_FRAME_DELAY),
                }
            })
            .collect();
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }
}

/// A frame due for display on a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinnerTick {
    pub session: SessionId,
    pub target: ButtonId,
    pub frame: usize,
}

struct Run {
    session: SessionId,
    target: ButtonId,
    current_frame: usize,
    last_frame_time: Instant,
    /// Whether the first frame has been delivered
    has_rendered: bool,
}

/// Steps the spinner frames for one target button at a time
pub struct SpinnerAnimator {
    frames: Arc<SpinnerFrames>,
    run: Option<Run>,
}

impl SpinnerAnimator {
    pub fn new(frames: Arc<SpinnerFrames>) -> Self {
        Self { frames, run: None }
    }

    /// Begin the sequence from its first frame; replaces any running sequence
    pub fn start(&mut self, session: SessionId, target: ButtonId, now: Instant) {
        self.run = Some(Run {
            session,
            target,
            current_frame: 0,
            last_frame_time: now,
            has_rendered: false,
        });
    }

    /// Halt frame delivery. The last delivered frame stays wherever the caller put it.
    pub fn stop(&mut self) -> bool {
        self.run.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    pub fn session(&self) -> Option<SessionId> {
        self.run.as_ref().map(|r| r.session)
    }

    /// Advance the animation and return the frame to show, if one is due
    pub fn tick(&mut self, now: Instant) -> Option<SpinnerTick> {
        let run = self.run.as_mut()?;
        if self.frames.is_empty() {
            return None;
        }

        if !run.has_rendered {
            run.has_rendered = true;
            run.last_frame_time = now;
            return Some(SpinnerTick {
                session: run.session,
                target: run.target,
                frame: 0,
            });
        }

        let delay = self.frames.get(run.current_frame)?.delay;
        if now.duration_since(run.last_frame_time) < delay {
            return None;
        }

        run.current_frame = (run.current_frame + 1) % self.frames.len();
        run.last_frame_time = now;
        Some(SpinnerTick {
            session: run.session,
            target: run.target,
            frame: run.current_frame,
        })
    }

    /// When the next frame is due
    pub fn next_deadline(&self) -> Option<Instant> {
        let run = self.run.as_ref()?;
        if !run.has_rendered {
            return Some(run.last_frame_time);
        }
        let delay = self.frames.get(run.current_frame)?.delay;
        Some(run.last_frame_time + delay)
    }

    pub fn frame_image(&self, frame: usize) -> Option<&Arc<RgbaImage>> {
        self.frames.get(frame).map(|f| &f.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator() -> SpinnerAnimator {
        SpinnerAnimator::new(Arc::new(SpinnerFrames::generated(Duration::from_millis(50))))
    }

    #[test]
    fn test_generated_frames_differ() {
        let frames = SpinnerFrames::generated(Duration::from_millis(50));
        assert_eq!(frames.len(), GENERATED_FRAMES);
        assert_ne!(
            frames.get(0).unwrap().image.as_raw(),
            frames.get(2).unwrap().image.as_raw()
        );
    }

    #[test]
    fn test_first_frame_is_immediate_then_paced() {
        let mut a = animator();
        let t0 = Instant::now();
        a.start(SessionId(1), ButtonId::Up, t0);

        let first = a.tick(t0).unwrap();
        assert_eq!(first.frame, 0);
        assert_eq!(first.target, ButtonId::Up);

        assert!(a.tick(t0 + Duration::from_millis(10)).is_none());
        assert_eq!(a.next_deadline(), Some(t0 + Duration::from_millis(50)));
        assert_eq!(a.tick(t0 + Duration::from_millis(50)).unwrap().frame, 1);
    }

    #[test]
    fn test_frames_wrap_around() {
        let mut a = animator();
        let mut now = Instant::now();
        a.start(SessionId(1), ButtonId::Select, now);
        a.tick(now);
        for _ in 0..GENERATED_FRAMES {
            now += Duration::from_millis(50);
            a.tick(now).unwrap();
        }
        now += Duration::from_millis(50);
        assert_eq!(a.tick(now).unwrap().frame, 1);
    }

    #[test]
    fn test_stop_halts_delivery() {
        let mut a = animator();
        let t0 = Instant::now();
        a.start(SessionId(3), ButtonId::Down, t0);
        assert!(a.stop());
        assert!(!a.stop());
        assert!(a.tick(t0 + Duration::from_secs(1)).is_none());
        assert!(a.next_deadline().is_none());
    }

    #[test]
    fn test_restart_replaces_session() {
        let mut a = animator();
        let t0 = Instant::now();
        a.start(SessionId(1), ButtonId::Up, t0);
        a.start(SessionId(2), ButtonId::Down, t0);
        let tick = a.tick(t0).unwrap();
        assert_eq!(tick.session, SessionId(2));
        assert_eq!(tick.target, ButtonId::Down);
    }

    #[test]
    fn test_decode_rejects_non_gif() {
        assert!(SpinnerFrames::decode_gif(b"nope", Duration::from_millis(80)).is_err());
    }
}
