//! Bounded retry around pixel acquisition from a canvas surface.

use std::time::Duration;

use crate::pixel::PixelBuffer;

use super::CanvasSurface;

pub const DEFAULT_ACQUIRE_RETRY_COUNT: u8 = 5;
pub const DEFAULT_ACQUIRE_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u8,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ACQUIRE_RETRY_COUNT,
            delay: DEFAULT_ACQUIRE_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub const fn single_attempt() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Runs `action` up to `retry_count` times, sleeping `retry_delay` between
/// attempts (never after the last one).
pub fn retry_until_some<T, F, S>(
    retry_count: u8,
    retry_delay: Duration,
    mut action: F,
    mut sleep: S,
) -> Option<T>
where
    F: FnMut(u8) -> Option<T>,
    S: FnMut(Duration),
{
    for attempt in 1..=retry_count {
        if let Some(value) = action(attempt) {
            return Some(value);
        }

        if attempt < retry_count {
            sleep(retry_delay);
        }
    }

    None
}

pub fn acquire_pixels<C: CanvasSurface + ?Sized>(
    surface: &C,
    policy: RetryPolicy,
) -> Option<PixelBuffer> {
    acquire_pixels_with(surface, policy, std::thread::sleep)
}

pub fn acquire_pixels_with<C, S>(surface: &C, policy: RetryPolicy, sleep: S) -> Option<PixelBuffer>
where
    C: CanvasSurface + ?Sized,
    S: FnMut(Duration),
{
    let acquired = retry_until_some(
        policy.attempts,
        policy.delay,
        |attempt| {
            let buffer = surface.current_pixels().filter(PixelBuffer::is_valid);
            if buffer.is_none() {
                tracing::debug!(attempt, max = policy.attempts, "canvas pixels unavailable");
            }
            buffer
        },
        sleep,
    );

    if acquired.is_none() {
        tracing::warn!(attempts = policy.attempts, "giving up on canvas pixel acquisition");
    }
    acquired
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use image::RgbaImage;

    use super::*;
    use crate::canvas::{ImageLayout, StrokeStyle};
    use crate::geometry::CanvasPoint;

    struct FlakySurface {
        ready_after: u8,
        calls: Cell<u8>,
    }

    impl CanvasSurface for FlakySurface {
        fn size(&self) -> (u32, u32) {
            (1, 1)
        }

        fn current_pixels(&self) -> Option<PixelBuffer> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call < self.ready_after {
                return None;
            }
            PixelBuffer::filled(1, 1, [1, 2, 3, 4]).ok()
        }

        fn paint(&mut self, _buffer: &PixelBuffer) {}

        fn clear(&mut self) {}

        fn draw_image(&mut self, _image: &RgbaImage, _layout: &ImageLayout) {}

        fn stroke_segment(&mut self, _from: CanvasPoint, _to: CanvasPoint, _style: &StrokeStyle) {}
    }

    #[test]
    fn retry_until_some_returns_value_without_extra_retries() {
        let calls = RefCell::new(Vec::new());
        let sleeps = RefCell::new(Vec::new());

        let result = retry_until_some(
            5,
            Duration::from_millis(10),
            |attempt| {
                calls.borrow_mut().push(attempt);
                (attempt == 3).then_some("ready")
            },
            |duration| sleeps.borrow_mut().push(duration),
        );

        assert_eq!(result, Some("ready"));
        assert_eq!(*calls.borrow(), vec![1, 2, 3]);
        assert_eq!(*sleeps.borrow(), vec![Duration::from_millis(10); 2]);
    }

    #[test]
    fn retry_until_some_stops_after_max_attempts() {
        let calls = RefCell::new(Vec::new());
        let sleeps = RefCell::new(Vec::new());

        let result = retry_until_some(
            4,
            Duration::from_millis(5),
            |attempt| {
                calls.borrow_mut().push(attempt);
                None::<u8>
            },
            |duration| sleeps.borrow_mut().push(duration),
        );

        assert_eq!(result, None);
        assert_eq!(*calls.borrow(), vec![1, 2, 3, 4]);
        assert_eq!(sleeps.borrow().len(), 3);
    }

    #[test]
    fn retry_until_some_with_zero_attempts_never_calls_action() {
        let result = retry_until_some(
            0,
            Duration::ZERO,
            |_| -> Option<()> { panic!("action must not run") },
            |_| panic!("sleep must not run"),
        );
        assert_eq!(result, None);
    }

    #[test]
    fn acquire_pixels_waits_for_flaky_surface() {
        let surface = FlakySurface {
            ready_after: 3,
            calls: Cell::new(0),
        };
        let sleeps = Cell::new(0);
        let policy = RetryPolicy {
            attempts: 5,
            delay: Duration::from_millis(1),
        };

        let buffer = acquire_pixels_with(&surface, policy, |_| sleeps.set(sleeps.get() + 1))
            .expect("surface becomes ready on third call");
        assert_eq!(buffer.pixels, vec![1, 2, 3, 4]);
        assert_eq!(surface.calls.get(), 3);
        assert_eq!(sleeps.get(), 2);
    }

    #[test]
    fn acquire_pixels_gives_up_after_policy_attempts() {
        let surface = FlakySurface {
            ready_after: 10,
            calls: Cell::new(0),
        };
        let policy = RetryPolicy {
            attempts: 2,
            delay: Duration::ZERO,
        };
        assert!(acquire_pixels_with(&surface, policy, |_| {}).is_none());
        assert_eq!(surface.calls.get(), 2);
    }
}
