//! Screen effects: tint, fade and shake.
//!
//! Tint is a four-channel color offset interpolated linearly over a frame
//! count. Fading to or from black is its own counter pair plus a flag so
//! the interpreter can ask "fully faded out?" while a transfer is in
//! flight. Shake is a time-limited sinusoidal offset.

use fable_data::command::ShakeDirection;
use serde::{Deserialize, Serialize};

/// Color offset: RGB in `[-1, 1]`, gray in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub gray: f64,
}

impl Tint {
    fn lerp(a: Tint, b: Tint, rate: f64) -> Tint {
        let mix = |from: f64, to: f64| from + (to - from) * rate;
        Tint {
            red: mix(a.red, b.red),
            green: mix(a.green, b.green),
            blue: mix(a.blue, b.blue),
            gray: mix(a.gray, b.gray),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    tint: Tint,
    orig_tint: Tint,
    target_tint: Tint,
    tint_count: u32,
    tint_max_count: u32,
    fade_count: u32,
    fade_max_count: u32,
    fading_in: bool,
    faded_out: bool,
    shake_power: i32,
    shake_speed: i32,
    shake_count: u32,
    shake_direction: ShakeDirection,
}

impl Screen {
    pub fn tint(&self) -> Tint {
        self.tint
    }

    /// Begin interpolating toward `target` over `frames` frames; zero
    /// applies immediately.
    pub fn start_tint(&mut self, target: Tint, frames: u32) {
        if frames == 0 {
            self.tint = target;
            self.orig_tint = target;
            self.target_tint = target;
            self.tint_count = 0;
            self.tint_max_count = 0;
            return;
        }
        self.orig_tint = self.tint;
        self.target_tint = target;
        self.tint_count = frames;
        self.tint_max_count = frames;
    }

    pub fn is_changing_tint(&self) -> bool {
        self.tint_count > 0
    }

    pub fn fade_out(&mut self, frames: u32) {
        self.fading_in = false;
        self.fade_count = frames;
        self.fade_max_count = frames;
        if frames == 0 {
            self.faded_out = true;
        }
    }

    pub fn fade_in(&mut self, frames: u32) {
        self.fading_in = true;
        self.fade_count = frames;
        self.fade_max_count = frames;
        if frames == 0 {
            self.faded_out = false;
        }
    }

    pub fn is_fading(&self) -> bool {
        self.fade_count > 0
    }

    pub fn is_faded_out(&self) -> bool {
        self.faded_out
    }

    /// Blackness in `[0, 1]` for the renderer.
    pub fn fade_rate(&self) -> f64 {
        if self.fade_count == 0 {
            return if self.faded_out { 1.0 } else { 0.0 };
        }
        let progress = 1.0 - f64::from(self.fade_count) / f64::from(self.fade_max_count);
        if self.fading_in { 1.0 - progress } else { progress }
    }

    pub fn start_shake(&mut self, power: i32, speed: i32, frames: u32, direction: ShakeDirection) {
        self.shake_power = power;
        self.shake_speed = speed;
        self.shake_count = frames;
        self.shake_direction = direction;
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_count > 0
    }

    /// Current shake offset in pixels, `(dx, dy)`.
    pub fn shake_offset(&self) -> (f64, f64) {
        if self.shake_count == 0 {
            return (0.0, 0.0);
        }
        let phase = f64::from(self.shake_count) * f64::from(self.shake_speed) * 0.5;
        let amount = f64::from(self.shake_power) * phase.sin();
        match self.shake_direction {
            ShakeDirection::Horizontal => (amount, 0.0),
            ShakeDirection::Vertical => (0.0, amount),
        }
    }

    pub fn update(&mut self) {
        if self.tint_count > 0 {
            self.tint_count -= 1;
            if self.tint_count == 0 {
                self.tint = self.target_tint;
            } else {
                let rate = 1.0 - f64::from(self.tint_count) / f64::from(self.tint_max_count);
                self.tint = Tint::lerp(self.orig_tint, self.target_tint, rate);
            }
        }
        if self.fade_count > 0 {
            self.fade_count -= 1;
            if self.fade_count == 0 {
                self.faded_out = !self.fading_in;
            }
        }
        if self.shake_count > 0 {
            self.shake_count -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_reaches_target_exactly() {
        let mut screen = Screen::default();
        let target = Tint {
            red: 0.5,
            green: -0.25,
            blue: 1.0,
            gray: 0.75,
        };
        screen.start_tint(target, 30);
        assert_eq!(screen.tint(), Tint::default());
        for _ in 0..30 {
            screen.update();
        }
        assert_eq!(screen.tint(), target);
        assert!(!screen.is_changing_tint());
    }

    #[test]
    fn tint_holds_origin_at_max_count() {
        let mut screen = Screen::default();
        let start = Tint {
            red: -1.0,
            ..Tint::default()
        };
        screen.start_tint(start, 0);
        screen.start_tint(Tint::default(), 10);
        // counter at max before the first update: still the origin
        assert_eq!(screen.tint(), start);
    }

    #[test]
    fn tint_interpolates_monotonically() {
        let mut screen = Screen::default();
        screen.start_tint(
            Tint {
                gray: 1.0,
                ..Tint::default()
            },
            10,
        );
        let mut prev = 0.0;
        for _ in 0..10 {
            screen.update();
            assert!(screen.tint().gray >= prev);
            prev = screen.tint().gray;
        }
        assert_eq!(prev, 1.0);
    }

    #[test]
    fn instant_tint_applies_immediately() {
        let mut screen = Screen::default();
        let target = Tint {
            blue: 0.3,
            ..Tint::default()
        };
        screen.start_tint(target, 0);
        assert_eq!(screen.tint(), target);
    }

    #[test]
    fn fade_out_then_in() {
        let mut screen = Screen::default();
        screen.fade_out(30);
        assert!(screen.is_fading());
        assert!(!screen.is_faded_out());
        for _ in 0..30 {
            screen.update();
        }
        assert!(!screen.is_fading());
        assert!(screen.is_faded_out());
        assert_eq!(screen.fade_rate(), 1.0);

        screen.fade_in(30);
        for _ in 0..30 {
            screen.update();
        }
        assert!(!screen.is_faded_out());
        assert_eq!(screen.fade_rate(), 0.0);
    }

    #[test]
    fn fade_rate_rises_while_fading_out() {
        let mut screen = Screen::default();
        screen.fade_out(10);
        let mut prev = -1.0;
        for _ in 0..10 {
            screen.update();
            let rate = screen.fade_rate();
            assert!(rate > prev);
            prev = rate;
        }
    }

    #[test]
    fn shake_expires() {
        let mut screen = Screen::default();
        screen.start_shake(8, 4, 5, ShakeDirection::Horizontal);
        assert!(screen.is_shaking());
        let (dx, dy) = screen.shake_offset();
        assert!(dx.abs() <= 8.0);
        assert_eq!(dy, 0.0);
        for _ in 0..5 {
            screen.update();
        }
        assert!(!screen.is_shaking());
        assert_eq!(screen.shake_offset(), (0.0, 0.0));
    }

    #[test]
    fn vertical_shake_moves_y() {
        let mut screen = Screen::default();
        screen.start_shake(8, 3, 5, ShakeDirection::Vertical);
        let (dx, _) = screen.shake_offset();
        assert_eq!(dx, 0.0);
    }

    #[test]
    fn roundtrip_mid_fade() {
        let mut screen = Screen::default();
        screen.fade_out(30);
        for _ in 0..10 {
            screen.update();
        }
        let bytes = rmp_serde::to_vec_named(&screen).unwrap();
        assert_eq!(screen, rmp_serde::from_slice::<Screen>(&bytes).unwrap());
    }
}
