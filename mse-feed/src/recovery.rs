//! Playback heuristics for live streams whose buffered edge keeps moving.

use crate::sink::PlaybackSurface;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecoveryConfig {
    /// Distance behind the buffered edge used when the surface is hidden.
    pub nudge_offset: f64,
    /// Distance behind the buffered edge used after a pause overrun.
    pub resume_offset: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            nudge_offset: 0.5,
            resume_offset: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StallRecovery {
    config: RecoveryConfig,
}

impl StallRecovery {
    pub fn new(config: RecoveryConfig) -> Self {
        Self { config }
    }

    /// Hidden surfaces may stop advancing; keep them near the live edge.
    ///
    /// Returns the new position when the surface was moved.
    pub fn nudge_if_hidden(&self, surface: &mut dyn PlaybackSurface) -> Option<f64> {
        if !surface.is_hidden() {
            return None;
        }
        let end = surface.buffered_end()?;
        let target = end - self.config.nudge_offset;
        surface.set_current_time(target);
        log::debug!("Recovery: surface hidden, nudged to {:.3}", target);
        Some(target)
    }

    /// A paused surface parked past the buffered edge is moved back and resumed.
    pub fn correct_pause_overrun(&self, surface: &mut dyn PlaybackSurface) -> Option<f64> {
        let end = surface.buffered_end()?;
        if surface.current_time() <= end {
            return None;
        }
        let target = end - self.config.resume_offset;
        log::info!(
            "Recovery: paused at {:.3} beyond buffered end {:.3}, resuming at {:.3}",
            surface.current_time(),
            end,
            target
        );
        surface.set_current_time(target);
        surface.play();
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Surface {
        time: f64,
        end: Option<f64>,
        hidden: bool,
        plays: usize,
    }

    impl PlaybackSurface for Surface {
        fn current_time(&self) -> f64 {
            self.time
        }
        fn set_current_time(&mut self, time: f64) {
            self.time = time;
        }
        fn buffered_end(&self) -> Option<f64> {
            self.end
        }
        fn is_hidden(&self) -> bool {
            self.hidden
        }
        fn play(&mut self) {
            self.plays += 1;
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pause_overrun_snaps_back_and_plays() {
        let mut surface = Surface {
            time: 105.0,
            end: Some(100.0),
            ..Default::default()
        };
        let moved = StallRecovery::default().correct_pause_overrun(&mut surface);

        assert!(approx(moved.unwrap(), 99.9));
        assert!(approx(surface.time, 99.9));
        assert_eq!(surface.plays, 1);
    }

    #[test]
    fn test_pause_within_buffer_is_left_alone() {
        let mut surface = Surface {
            time: 80.0,
            end: Some(100.0),
            ..Default::default()
        };
        assert!(StallRecovery::default().correct_pause_overrun(&mut surface).is_none());
        assert_eq!(surface.time, 80.0);
        assert_eq!(surface.plays, 0);
    }

    #[test]
    fn test_hidden_surface_nudged() {
        let mut surface = Surface {
            time: 10.0,
            end: Some(50.0),
            hidden: true,
            ..Default::default()
        };
        let moved = StallRecovery::default().nudge_if_hidden(&mut surface);
        assert!(approx(moved.unwrap(), 49.5));
        assert!(approx(surface.time, 49.5));
    }

    #[test]
    fn test_visible_surface_not_nudged() {
        let mut surface = Surface {
            time: 10.0,
            end: Some(50.0),
            ..Default::default()
        };
        assert!(StallRecovery::default().nudge_if_hidden(&mut surface).is_none());
        assert_eq!(surface.time, 10.0);
    }

    #[test]
    fn test_nothing_buffered() {
        let mut surface = Surface {
            time: 3.0,
            hidden: true,
            ..Default::default()
        };
        let recovery = StallRecovery::default();
        assert!(recovery.nudge_if_hidden(&mut surface).is_none());
        assert!(recovery.correct_pause_overrun(&mut surface).is_none());
    }

    #[test]
    fn test_custom_offsets() {
        let recovery = StallRecovery::new(RecoveryConfig {
            nudge_offset: 2.0,
            resume_offset: 1.0,
        });
        let mut surface = Surface {
            time: 30.0,
            end: Some(20.0),
            hidden: true,
            ..Default::default()
        };
        assert!(approx(recovery.correct_pause_overrun(&mut surface).unwrap(), 19.0));
        assert!(approx(recovery.nudge_if_hidden(&mut surface).unwrap(), 18.0));
    }
}
