//! Ten-star rating input.
//!
//! The widget is controlled: a click reports the chosen star through the
//! change callback and the owner decides whether to call `set_rating`.

use crate::geometry::Point;
use crate::scene::{DrawCommand, Scene};
use crate::Color;
use tracing::debug;

pub const STAR_COUNT: u8 = 10;

const STAR_PITCH: f64 = 24.0;
const STAR_RADIUS: f64 = 9.0;
const FILLED: Color = Color::hex(0xfbc02d);
const EMPTY: Color = Color::hex(0xbdbdbd);

pub struct RatingWidget {
    rating: u8,
    disabled: bool,
    on_change: Option<Box<dyn FnMut(u8)>>,
}

impl RatingWidget {
    pub fn new(rating: u8) -> Self {
        Self {
            rating: rating.min(STAR_COUNT),
            disabled: false,
            on_change: None,
        }
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(u8) + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.rating = rating.min(STAR_COUNT);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Report a click on `star` (1-based). Returns whether a change was
    /// emitted.
    pub fn click(&mut self, star: u8) -> bool {
        if self.disabled || !(1..=STAR_COUNT).contains(&star) {
            return false;
        }
        debug!(star, "rating clicked");
        match self.on_change.as_mut() {
            Some(callback) => {
                callback(star);
                true
            }
            None => false,
        }
    }

    /// `true` for each star at or below the current rating.
    pub fn stars(&self) -> [bool; STAR_COUNT as usize] {
        std::array::from_fn(|i| (i as u8) < self.rating)
    }

    /// Star under `x`, in scene coordinates.
    pub fn star_at(&self, x: f64) -> Option<u8> {
        let index = (x / STAR_PITCH).floor();
        if !(0.0..f64::from(STAR_COUNT)).contains(&index) {
            return None;
        }
        Some(index as u8 + 1)
    }

    pub fn size(&self) -> (f64, f64) {
        (STAR_PITCH * f64::from(STAR_COUNT), STAR_PITCH)
    }

    pub fn scene(&self) -> Scene {
        let (width, height) = self.size();
        let mut scene = Scene::new(width, height);
        for (i, filled) in self.stars().into_iter().enumerate() {
            let center = Point::new(STAR_PITCH * (i as f64 + 0.5), height / 2.0);
            if filled {
                scene.add_command(DrawCommand::Circle {
                    center,
                    radius: STAR_RADIUS,
                    color: FILLED,
                });
            } else {
                scene.add_command(DrawCommand::Ring {
                    center,
                    radius: STAR_RADIUS - 1.0,
                    thickness: 2.0,
                    rotation_deg: 0.0,
                    dash_offset: None,
                    color: EMPTY,
                });
            }
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(rating: u8) -> (RatingWidget, Rc<RefCell<Vec<u8>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let widget = RatingWidget::new(rating).on_change(move |star| sink.borrow_mut().push(star));
        (widget, seen)
    }

    #[test]
    fn clicks_emit_the_star_index() {
        let (mut widget, seen) = recording(3);
        assert!(widget.click(7));
        assert!(widget.click(1));
        assert_eq!(*seen.borrow(), [7, 1]);
        assert_eq!(widget.rating(), 3);
    }

    #[test]
    fn disabled_widget_ignores_clicks() {
        let (mut widget, seen) = recording(5);
        widget.set_disabled(true);
        assert!(!widget.click(4));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn out_of_range_stars_are_ignored() {
        let (mut widget, seen) = recording(0);
        assert!(!widget.click(0));
        assert!(!widget.click(11));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn stars_fill_up_to_rating() {
        let mut widget = RatingWidget::new(4);
        let stars = widget.stars();
        assert_eq!(stars.iter().filter(|s| **s).count(), 4);
        assert!(stars[3] && !stars[4]);

        widget.set_rating(42);
        assert_eq!(widget.rating(), 10);
        let filled = widget
            .scene()
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count();
        assert_eq!(filled, 10);
    }

    #[test]
    fn hit_testing_maps_x_to_star() {
        let widget = RatingWidget::new(0);
        assert_eq!(widget.star_at(0.0), Some(1));
        assert_eq!(widget.star_at(25.0), Some(2));
        assert_eq!(widget.star_at(239.0), Some(10));
        assert_eq!(widget.star_at(240.0), None);
        assert_eq!(widget.star_at(-1.0), None);
    }
}
