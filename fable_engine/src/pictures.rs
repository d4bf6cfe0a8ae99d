//! Overlay pictures.
//!
//! Pictures are ID-addressed sprite slots stored sparsely and grown on
//! write. Each slot carries independent timed interpolations for position,
//! scale, angle, opacity and tint; the interpreter can block until a
//! slot's animations settle.

use fable_data::command::{BlendType, PictureOrigin, PicturePriority, ShowPictureArgs};
use serde::{Deserialize, Serialize};

use crate::screen::Tint;

/// Linear interpolation of up to two scalars over a frame count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Tween {
    count: u32,
    max: u32,
    from: (f64, f64),
    to: (f64, f64),
}

impl Tween {
    fn new(from: (f64, f64), to: (f64, f64), frames: u32) -> Self {
        Self {
            count: frames,
            max: frames,
            from,
            to,
        }
    }

    /// Advance one frame; returns the current value and whether the tween
    /// has finished.
    fn step(&mut self) -> ((f64, f64), bool) {
        self.count -= 1;
        if self.count == 0 {
            return (self.to, true);
        }
        let rate = 1.0 - f64::from(self.count) / f64::from(self.max);
        let mix = |a: f64, b: f64| a + (b - a) * rate;
        ((mix(self.from.0, self.to.0), mix(self.from.1, self.to.1)), false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    pub id: u32,
    pub image: String,
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub angle: f64,
    pub opacity: f64,
    pub origin: PictureOrigin,
    pub blend: BlendType,
    pub priority: PicturePriority,
    pub tint: Tint,
    moving: Option<Tween>,
    scaling: Option<Tween>,
    rotating: Option<Tween>,
    fading: Option<Tween>,
    tinting_gray: Option<Tween>,
    tinting_rgb: Option<Tween>,
}

impl Picture {
    fn is_animating(&self) -> bool {
        self.moving.is_some()
            || self.scaling.is_some()
            || self.rotating.is_some()
            || self.fading.is_some()
            || self.tinting_gray.is_some()
            || self.tinting_rgb.is_some()
    }

    fn update(&mut self) {
        if let Some(tween) = &mut self.moving {
            let ((x, y), done) = tween.step();
            self.x = x;
            self.y = y;
            if done {
                self.moving = None;
            }
        }
        if let Some(tween) = &mut self.scaling {
            let ((sx, sy), done) = tween.step();
            self.scale_x = sx;
            self.scale_y = sy;
            if done {
                self.scaling = None;
            }
        }
        if let Some(tween) = &mut self.rotating {
            let ((angle, _), done) = tween.step();
            self.angle = angle;
            if done {
                self.rotating = None;
            }
        }
        if let Some(tween) = &mut self.fading {
            let ((opacity, _), done) = tween.step();
            self.opacity = opacity;
            if done {
                self.fading = None;
            }
        }
        if let Some(tween) = &mut self.tinting_rgb {
            let ((red, green), done) = tween.step();
            self.tint.red = red;
            self.tint.green = green;
            if done {
                self.tinting_rgb = None;
            }
        }
        if let Some(tween) = &mut self.tinting_gray {
            let ((blue, gray), done) = tween.step();
            self.tint.blue = blue;
            self.tint.gray = gray;
            if done {
                self.tinting_gray = None;
            }
        }
    }
}

/// The picture layer: sparse slots indexed by picture id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pictures {
    slots: Vec<Option<Picture>>,
}

impl Pictures {
    pub fn get(&self, id: u32) -> Option<&Picture> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut Picture> {
        self.slots.get_mut(id as usize).and_then(Option::as_mut)
    }

    /// Create or replace the slot for `args.id`.
    pub fn show(&mut self, args: &ShowPictureArgs) {
        let idx = args.id as usize;
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, None);
        }
        self.slots[idx] = Some(Picture {
            id: args.id,
            image: args.image.clone(),
            x: f64::from(args.x),
            y: f64::from(args.y),
            scale_x: args.scale_x,
            scale_y: args.scale_y,
            angle: args.angle,
            opacity: f64::from(args.opacity),
            origin: args.origin,
            blend: args.blend,
            priority: args.priority,
            ..Picture::default()
        });
    }

    pub fn erase(&mut self, id: u32) {
        if let Some(slot) = self.slots.get_mut(id as usize) {
            *slot = None;
        }
    }

    pub fn move_to(&mut self, id: u32, x: i32, y: i32, frames: u32) {
        let Some(pic) = self.get_mut(id) else { return };
        if frames == 0 {
            pic.x = f64::from(x);
            pic.y = f64::from(y);
            pic.moving = None;
            return;
        }
        pic.moving = Some(Tween::new((pic.x, pic.y), (f64::from(x), f64::from(y)), frames));
    }

    pub fn scale_to(&mut self, id: u32, scale_x: f64, scale_y: f64, frames: u32) {
        let Some(pic) = self.get_mut(id) else { return };
        if frames == 0 {
            pic.scale_x = scale_x;
            pic.scale_y = scale_y;
            pic.scaling = None;
            return;
        }
        pic.scaling = Some(Tween::new((pic.scale_x, pic.scale_y), (scale_x, scale_y), frames));
    }

    pub fn rotate_to(&mut self, id: u32, angle: f64, frames: u32) {
        let Some(pic) = self.get_mut(id) else { return };
        if frames == 0 {
            pic.angle = angle;
            pic.rotating = None;
            return;
        }
        pic.rotating = Some(Tween::new((pic.angle, 0.0), (angle, 0.0), frames));
    }

    pub fn fade_to(&mut self, id: u32, opacity: u8, frames: u32) {
        let Some(pic) = self.get_mut(id) else { return };
        if frames == 0 {
            pic.opacity = f64::from(opacity);
            pic.fading = None;
            return;
        }
        pic.fading = Some(Tween::new((pic.opacity, 0.0), (f64::from(opacity), 0.0), frames));
    }

    pub fn tint_to(&mut self, id: u32, tint: Tint, frames: u32) {
        let Some(pic) = self.get_mut(id) else { return };
        if frames == 0 {
            pic.tint = tint;
            pic.tinting_rgb = None;
            pic.tinting_gray = None;
            return;
        }
        pic.tinting_rgb = Some(Tween::new((pic.tint.red, pic.tint.green), (tint.red, tint.green), frames));
        pic.tinting_gray = Some(Tween::new((pic.tint.blue, pic.tint.gray), (tint.blue, tint.gray), frames));
    }

    pub fn change_image(&mut self, id: u32, image: &str) {
        if let Some(pic) = self.get_mut(id) {
            pic.image = image.to_string();
        }
    }

    /// True while the slot has any timed animation in flight.
    pub fn is_animating(&self, id: u32) -> bool {
        self.get(id).is_some_and(Picture::is_animating)
    }

    pub fn update(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.update();
        }
    }

    /// Ids in draw order: priority bucket first, then id ascending.
    pub fn draw_order(&self) -> Vec<u32> {
        let mut ids: Vec<(PicturePriority, u32)> = self
            .slots
            .iter()
            .flatten()
            .map(|p| (p.priority, p.id))
            .collect();
        ids.sort_by_key(|(priority, id)| (*priority as u8, *id));
        ids.into_iter().map(|(_, id)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show_args(id: u32) -> ShowPictureArgs {
        ShowPictureArgs {
            id,
            image: format!("pic{id}"),
            x: 0,
            y: 0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            opacity: 255,
            origin: PictureOrigin::TopLeft,
            blend: BlendType::Normal,
            priority: PicturePriority::Overlay,
        }
    }

    #[test]
    fn show_grows_slots_and_replaces() {
        let mut pics = Pictures::default();
        pics.show(&show_args(5));
        assert!(pics.get(5).is_some());
        assert!(pics.get(4).is_none());

        let mut replacement = show_args(5);
        replacement.image = "other".into();
        pics.show(&replacement);
        assert_eq!(pics.get(5).unwrap().image, "other");
    }

    #[test]
    fn erase_clears_slot() {
        let mut pics = Pictures::default();
        pics.show(&show_args(2));
        pics.erase(2);
        assert!(pics.get(2).is_none());
        // erasing an empty slot is fine
        pics.erase(9);
    }

    #[test]
    fn move_interpolates_and_settles() {
        let mut pics = Pictures::default();
        pics.show(&show_args(1));
        pics.move_to(1, 10, 20, 10);
        assert!(pics.is_animating(1));
        for _ in 0..10 {
            pics.update();
        }
        let pic = pics.get(1).unwrap();
        assert_eq!((pic.x, pic.y), (10.0, 20.0));
        assert!(!pics.is_animating(1));
    }

    #[test]
    fn instant_move_applies_immediately() {
        let mut pics = Pictures::default();
        pics.show(&show_args(1));
        pics.move_to(1, 7, 8, 0);
        assert!(!pics.is_animating(1));
        let pic = pics.get(1).unwrap();
        assert_eq!((pic.x, pic.y), (7.0, 8.0));
    }

    #[test]
    fn fade_reaches_target_exactly() {
        let mut pics = Pictures::default();
        pics.show(&show_args(1));
        pics.fade_to(1, 0, 30);
        for _ in 0..30 {
            pics.update();
        }
        assert_eq!(pics.get(1).unwrap().opacity, 0.0);
    }

    #[test]
    fn tint_animates_all_channels() {
        let mut pics = Pictures::default();
        pics.show(&show_args(1));
        let target = Tint {
            red: 0.5,
            green: -0.5,
            blue: 1.0,
            gray: 0.25,
        };
        pics.tint_to(1, target, 12);
        for _ in 0..12 {
            pics.update();
        }
        assert_eq!(pics.get(1).unwrap().tint, target);
    }

    #[test]
    fn draw_order_is_priority_then_id() {
        let mut pics = Pictures::default();
        let mut bottom = show_args(9);
        bottom.priority = PicturePriority::Bottom;
        let mut top = show_args(1);
        top.priority = PicturePriority::Top;
        pics.show(&show_args(4));
        pics.show(&show_args(2));
        pics.show(&bottom);
        pics.show(&top);
        assert_eq!(pics.draw_order(), vec![9, 2, 4, 1]);
    }

    #[test]
    fn animations_target_missing_slots_are_noops() {
        let mut pics = Pictures::default();
        pics.move_to(3, 1, 1, 5);
        pics.fade_to(3, 0, 5);
        assert!(!pics.is_animating(3));
    }

    #[test]
    fn roundtrip_mid_animation() {
        let mut pics = Pictures::default();
        pics.show(&show_args(1));
        pics.move_to(1, 30, 0, 20);
        pics.update();
        pics.update();
        let bytes = rmp_serde::to_vec_named(&pics).unwrap();
        assert_eq!(pics, rmp_serde::from_slice::<Pictures>(&bytes).unwrap());
    }
}
