//! Length-bounded polyline of recent pointer positions.
//!
//! Points are stored newest first. The chain of selected orbs is laid out
//! along this polyline, one selected diameter apart, starting at the finger.

use std::collections::VecDeque;

use bevy::math::Vec2;

#[derive(Debug, Clone, Default)]
pub struct TouchTrail {
    points: VecDeque<Vec2>,
    max_length: f32,
}

impl TouchTrail {
    pub fn new(max_length: f32) -> Self {
        Self {
            points: VecDeque::new(),
            max_length: max_length.max(0.0),
        }
    }

    /// Records a new most-recent point.
    pub fn add_point(&mut self, point: Vec2) {
        self.points.push_front(point);
        self.trim();
    }

    /// Appends a point behind the oldest one.
    pub fn add_point_to_end(&mut self, point: Vec2) {
        self.points.push_back(point);
        self.trim();
    }

    pub fn set_max_length(&mut self, max_length: f32) {
        self.max_length = max_length.max(0.0);
        self.trim();
    }

    pub fn max_length(&self) -> f32 {
        self.max_length
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }

    pub fn newest(&self) -> Option<Vec2> {
        self.points.front().copied()
    }

    /// Sum of all segment lengths.
    pub fn total_length(&self) -> f32 {
        self.segments().map(|(newer, older)| newer.distance(older)).sum()
    }

    /// Clips the polyline at the maximum length: the segment that crosses
    /// the limit is shortened to end on it and every older point is dropped.
    pub fn trim(&mut self) {
        let mut length = 0.0;
        let mut clip = None;
        for (i, (newer, older)) in self.segments().enumerate() {
            let segment = newer.distance(older);
            if length + segment > self.max_length {
                let keep = (self.max_length - length).max(0.0);
                clip = Some((i + 1, newer.lerp(older, keep / segment)));
                break;
            }
            length += segment;
        }
        if let Some((index, end)) = clip {
            self.points.truncate(index + 1);
            self.points[index] = end;
        }
    }

    /// Point at `target` distance along the trail from the newest point.
    ///
    /// A single-point trail yields that point. Returns `None` for an empty
    /// trail or a target past the trail's end.
    pub fn interpolate_at(&self, target: f32) -> Option<Vec2> {
        match self.points.len() {
            0 => return None,
            1 => return self.points.front().copied(),
            _ => {}
        }

        let mut length = 0.0;
        for (newer, older) in self.segments() {
            let segment = newer.distance(older);
            length += segment;
            if length >= target {
                if segment <= f32::EPSILON {
                    return Some(older);
                }
                let overshoot = (length - target) / segment;
                return Some(older.lerp(newer, overshoot));
            }
        }
        None
    }

    /// `n` points at `spacing, 2·spacing, …, n·spacing` along the trail.
    ///
    /// Targets past the end of the trail clamp to the oldest point, so a
    /// non-empty trail always yields exactly `n` points.
    #[allow(clippy::cast_precision_loss)]
    pub fn interpolate_coords(&self, n: usize, spacing: f32) -> Vec<Vec2> {
        let Some(&oldest) = self.points.back() else {
            return Vec::new();
        };
        (1..=n)
            .map(|i| self.interpolate_at(i as f32 * spacing).unwrap_or(oldest))
            .collect()
    }

    fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.iter().zip(self.points.iter().skip(1)).map(|(a, b)| (*a, *b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_polyline(trail: &TouchTrail, p: Vec2) -> bool {
        let pts: Vec<Vec2> = trail.points().collect();
        pts.windows(2).any(|w| {
            let (a, b) = (w[0], w[1]);
            let ab = b - a;
            let t = ((p - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
            (a + ab * t).distance(p) < 1e-3
        })
    }

    #[test]
    fn test_add_point_inserts_newest_first() {
        let mut trail = TouchTrail::new(100.0);
        trail.add_point(Vec2::new(0.0, 0.0));
        trail.add_point(Vec2::new(1.0, 0.0));
        assert_eq!(trail.newest(), Some(Vec2::new(1.0, 0.0)));
        trail.add_point_to_end(Vec2::new(-1.0, 0.0));
        assert_eq!(trail.points().last(), Some(Vec2::new(-1.0, 0.0)));
    }

    #[test]
    fn test_trim_bounds_total_length() {
        let mut trail = TouchTrail::new(10.0);
        for i in 0..50 {
            let angle = i as f32 * 0.7;
            trail.add_point(Vec2::new(angle.cos() * i as f32 * 0.3, angle.sin() * 2.0));
            assert!(trail.total_length() <= trail.max_length() + 1e-4);
        }

        trail.set_max_length(3.0);
        assert!(trail.total_length() <= 3.0 + 1e-4);
    }

    #[test]
    fn test_trim_leaves_single_point() {
        let mut trail = TouchTrail::new(0.0);
        trail.add_point(Vec2::new(5.0, 5.0));
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn test_interpolate_at() {
        let mut trail = TouchTrail::new(100.0);
        assert!(trail.interpolate_at(1.0).is_none());

        trail.add_point(Vec2::new(10.0, 0.0));
        assert_eq!(trail.interpolate_at(3.0), Some(Vec2::new(10.0, 0.0)));

        trail.add_point(Vec2::new(0.0, 0.0));
        trail.add_point(Vec2::new(0.0, 10.0));
        // newest (0,10) -> (0,0) -> (10,0)
        let p = trail.interpolate_at(4.0).unwrap();
        assert!(p.distance(Vec2::new(0.0, 6.0)) < 1e-4);
        let p = trail.interpolate_at(15.0).unwrap();
        assert!(p.distance(Vec2::new(5.0, 0.0)) < 1e-4);
        assert_eq!(trail.interpolate_at(0.0), Some(Vec2::new(0.0, 10.0)));
        assert!(trail.interpolate_at(20.5).is_none());
    }

    #[test]
    fn test_interpolate_coords_spacing() {
        let mut trail = TouchTrail::new(100.0);
        trail.add_point(Vec2::new(0.0, 0.0));
        trail.add_point(Vec2::new(8.0, 0.0));
        trail.add_point(Vec2::new(8.0, 12.0));
        trail.add_point(Vec2::new(0.0, 12.0));

        let spacing = 2.5;
        let coords = trail.interpolate_coords(10, spacing);
        assert_eq!(coords.len(), 10);
        assert!(coords[0].distance(Vec2::new(0.0, 12.0)) > spacing - 1e-3);
        for p in &coords {
            assert!(on_polyline(&trail, *p));
        }
        for pair in coords.windows(2) {
            // Straight sections are exact; corners cut slightly short.
            let d = pair[0].distance(pair[1]);
            assert!(d <= spacing + 1e-3 && d >= spacing * 0.7, "{d}");
        }
    }

    #[test]
    fn test_interpolate_coords_degenerate() {
        let mut trail = TouchTrail::new(100.0);
        assert!(trail.interpolate_coords(3, 1.0).is_empty());

        trail.add_point(Vec2::new(1.0, 1.0));
        assert!(trail.interpolate_coords(0, 1.0).is_empty());
        assert_eq!(trail.interpolate_coords(2, 1.0), vec![Vec2::new(1.0, 1.0); 2]);

        trail.add_point(Vec2::new(2.0, 1.0));
        let coords = trail.interpolate_coords(3, 1.0);
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[2], Vec2::new(1.0, 1.0));
    }
}
