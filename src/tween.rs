//! Frame-driven interpolation of a vector property.

use std::time::Duration;

use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Easing {
    #[cfg(test)]
    Linear,
    /// Fast start, long settle: `1 - 2^(-10k)`.
    ExponentialOut,
}

impl Easing {
    /// Map linear progress `k` in `[0, 1]` to eased progress.
    pub(crate) fn apply(self, k: f32) -> f32 {
        match self {
            #[cfg(test)]
            Easing::Linear => k,
            Easing::ExponentialOut => {
                if k >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * k)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Tween {
    from: Vector3<f32>,
    to: Vector3<f32>,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    pub(crate) fn new(from: Vector3<f32>, to: Vector3<f32>, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    /// Step the tween forward and return the interpolated value.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vector3<f32> {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    pub(crate) fn value(&self) -> Vector3<f32> {
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f32() / self.duration.as_secs_f32()
        };
        self.from.lerp(&self.to, self.easing.apply(progress))
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
