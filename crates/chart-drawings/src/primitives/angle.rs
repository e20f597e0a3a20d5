// File: crates/chart-drawings/src/primitives/angle.rs
// Summary: Ephemeral angle annotation: reference line, measured segment, arc and degree label.

use crate::geometry::{screen_angle_deg, Pt};
use crate::mapper::CoordinateMapper;
use crate::render::{Stroke, Surface};
use crate::style::Rgba;
use crate::types::Point;

const REFERENCE_COLOR: Rgba = Rgba::rgb(0xff, 0xee, 0x58);
const ARC_COLOR: Rgba = Rgba::rgb(255, 0, 0);

/// Not persisted and not hit-tested; lives until the next symbol switch.
#[derive(Clone, Debug)]
pub struct AngleMarker {
    pub p1: Point,
    pub p2: Point,
    /// Screen angle of p1->p2 when placed, counter-clockwise positive.
    pub degree: f64,
    radius: f64,
    geometry: Option<(Pt, Pt)>,
}

impl AngleMarker {
    /// Measure the angle between the two points as they appear on screen now.
    pub fn new(mapper: &CoordinateMapper<'_>, p1: Point, p2: Point, radius: f64) -> Option<Self> {
        let a = Pt::new(mapper.to_x(&p1)?, mapper.to_y(p1.price)?);
        let b = Pt::new(mapper.to_x(&p2)?, mapper.to_y(p2.price)?);
        Some(Self { p1, p2, degree: screen_angle_deg(a, b), radius, geometry: Some((a, b)) })
    }

    pub fn label(&self) -> String { format!("{}", self.degree.round() as i64) }

    pub fn update_geometry(&mut self, mapper: &CoordinateMapper<'_>) {
        let resolve = |p: &Point| Some(Pt::new(mapper.to_x(p)?, mapper.to_y(p.price)?));
        self.geometry = resolve(&self.p1).zip(resolve(&self.p2));
    }

    pub fn render(&self, surface: &mut dyn Surface, ratio: f64) {
        let Some((a, b)) = self.geometry else { return };
        let (a, b) = (a.scaled(ratio), b.scaled(ratio));
        let radius = self.radius * ratio;

        let reach = (b.x - a.x).abs().max(radius * 2.0);
        let reference = Stroke::dashed(REFERENCE_COLOR, 3.0, [10.0, 3.0]);
        surface.stroke_line(a, Pt::new(a.x + reach, a.y), &reference);
        surface.stroke_line(a, b, &Stroke::solid(Rgba::WHITE, 3.0));
        surface.stroke_arc(a, radius, 0.0, self.degree, &Stroke::solid(ARC_COLOR, 2.0));

        let text = self.label();
        let size = 14.0 * ratio as f32;
        let w = surface.measure_text(&text, size);
        surface.fill_text(&text, Pt::new(a.x + 30.0 * ratio - w / 2.0, a.y - 5.0 * ratio), size, Rgba::WHITE);
    }
}
