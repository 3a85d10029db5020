use std::f64::consts::{PI, TAU};

use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::error::{invalid, Result};
use crate::drawer::model::{Color, PixelRect, Point};
use crate::drawer::raster;
use crate::drawer::text;

pub const DEFAULT_SHAPE_COLOR: Color = Color::GRAY;
pub const DEFAULT_CANVAS_TEXT_COLOR: Color = Color::BLUE;
pub const DEFAULT_BOUNDED_TEXT_COLOR: Color = Color::BLACK;

/// Fill and optional outline for rectangles, ellipses and polygons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub fill: Color,
    pub border_thickness: i32,
    /// Outline color; `None` reuses the fill color.
    pub border: Option<Color>,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            fill: DEFAULT_SHAPE_COLOR,
            border_thickness: 0,
            border: None,
        }
    }
}

impl BoxStyle {
    pub fn filled(fill: Color) -> Self {
        Self {
            fill,
            ..Self::default()
        }
    }

    pub fn outlined(fill: Color, border_thickness: i32, border: Color) -> Self {
        Self {
            fill,
            border_thickness,
            border: Some(border),
        }
    }

    pub fn border_color(&self) -> Color {
        self.border.unwrap_or(self.fill)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineGeometry {
    Points { start: Point, end: Point },
    /// `rotation` in radians, 0 points north and grows clockwise.
    Polar {
        start: Point,
        length: f64,
        rotation: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextPlacement {
    /// Centered on the whole surface.
    FullCanvas,
    /// Centered in a rectangle given in scaled coordinates.
    Bounded(PixelRect),
}

/// One queued drawing primitive. Coordinates are logical and scaled at render
/// time, except for `Bezier` which always renders in raw pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle {
        rect: PixelRect,
        style: BoxStyle,
    },
    Ellipse {
        rect: PixelRect,
        style: BoxStyle,
    },
    Polygon {
        origin: Point,
        vertices: i32,
        radius: i32,
        rotation: f64,
        style: BoxStyle,
    },
    Line {
        geometry: LineGeometry,
        color: Color,
        thickness: i32,
    },
    Bezier {
        points: [Point; 4],
        color: Color,
        thickness: i32,
    },
    Text {
        text: String,
        point_size: f32,
        color: Color,
        placement: TextPlacement,
    },
}

impl Shape {
    pub fn rectangle(x: i32, y: i32, width: i32, height: i32, style: BoxStyle) -> Result<Self> {
        Self::Rectangle {
            rect: PixelRect::new(x, y, width, height),
            style,
        }
        .validated()
    }

    pub fn centered_rectangle(
        cx: i32,
        cy: i32,
        width: i32,
        height: i32,
        style: BoxStyle,
    ) -> Result<Self> {
        Self::rectangle(
            cx.saturating_sub(width / 2),
            cy.saturating_sub(height / 2),
            width,
            height,
            style,
        )
    }

    pub fn ellipse(x: i32, y: i32, width: i32, height: i32, style: BoxStyle) -> Result<Self> {
        Self::Ellipse {
            rect: PixelRect::new(x, y, width, height),
            style,
        }
        .validated()
    }

    pub fn centered_ellipse(
        cx: i32,
        cy: i32,
        width: i32,
        height: i32,
        style: BoxStyle,
    ) -> Result<Self> {
        Self::ellipse(
            cx.saturating_sub(width / 2),
            cy.saturating_sub(height / 2),
            width,
            height,
            style,
        )
    }

    pub fn polygon(
        x: i32,
        y: i32,
        vertices: i32,
        radius: i32,
        rotation: f64,
        style: BoxStyle,
    ) -> Result<Self> {
        Self::Polygon {
            origin: Point::new(x, y),
            vertices,
            radius,
            rotation,
            style,
        }
        .validated()
    }

    pub fn line(start: Point, end: Point, color: Color, thickness: i32) -> Result<Self> {
        Self::Line {
            geometry: LineGeometry::Points { start, end },
            color,
            thickness,
        }
        .validated()
    }

    pub fn polar_line(
        start: Point,
        length: f64,
        rotation: f64,
        color: Color,
        thickness: i32,
    ) -> Result<Self> {
        Self::Line {
            geometry: LineGeometry::Polar {
                start,
                length,
                rotation,
            },
            color,
            thickness,
        }
        .validated()
    }

    pub fn bezier(points: [Point; 4], color: Color, thickness: i32) -> Result<Self> {
        Self::Bezier {
            points,
            color,
            thickness,
        }
        .validated()
    }

    pub fn text(text: impl Into<String>, point_size: f32, color: Option<Color>) -> Result<Self> {
        Self::Text {
            text: text.into(),
            point_size,
            color: color.unwrap_or(DEFAULT_CANVAS_TEXT_COLOR),
            placement: TextPlacement::FullCanvas,
        }
        .validated()
    }

    pub fn bounded_text(
        text: impl Into<String>,
        point_size: f32,
        bounds: PixelRect,
        color: Option<Color>,
    ) -> Result<Self> {
        Self::Text {
            text: text.into(),
            point_size,
            color: color.unwrap_or(DEFAULT_BOUNDED_TEXT_COLOR),
            placement: TextPlacement::Bounded(bounds),
        }
        .validated()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rectangle { .. } => "rectangle",
            Self::Ellipse { .. } => "ellipse",
            Self::Polygon { .. } => "polygon",
            Self::Line { .. } => "line",
            Self::Bezier { .. } => "bezier",
            Self::Text { .. } => "text",
        }
    }

    /// Checks the per-variant constraints a queued shape must satisfy.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Rectangle { rect, style } | Self::Ellipse { rect, style } => {
                if rect.width < 1 || rect.height < 1 {
                    return Err(invalid(format!(
                        "{} size {}x{} must be at least 1x1",
                        self.kind(),
                        rect.width,
                        rect.height
                    )));
                }
                check_border(style)
            }
            Self::Polygon {
                vertices,
                radius,
                rotation,
                style,
                ..
            } => {
                if *vertices < 3 {
                    return Err(invalid(format!(
                        "polygon needs at least 3 vertices, got {vertices}"
                    )));
                }
                if *radius < 0 {
                    return Err(invalid(format!("polygon radius {radius} is negative")));
                }
                if !rotation.is_finite() {
                    return Err(invalid("polygon rotation must be finite"));
                }
                check_border(style)
            }
            Self::Line {
                geometry,
                thickness,
                ..
            } => {
                check_thickness(*thickness)?;
                if let LineGeometry::Polar {
                    length, rotation, ..
                } = geometry
                {
                    if !length.is_finite() || *length < 0.0 {
                        return Err(invalid(format!("line length {length} is invalid")));
                    }
                    if !rotation.is_finite() {
                        return Err(invalid("line rotation must be finite"));
                    }
                }
                Ok(())
            }
            Self::Bezier { thickness, .. } => check_thickness(*thickness),
            Self::Text {
                point_size,
                placement,
                ..
            } => {
                if !point_size.is_finite() || *point_size < 1.0 {
                    return Err(invalid(format!(
                        "text point size {point_size} must be at least 1"
                    )));
                }
                if let TextPlacement::Bounded(bounds) = placement {
                    if bounds.width < 0 || bounds.height < 0 {
                        return Err(invalid(format!(
                            "text bounds {}x{} are negative",
                            bounds.width, bounds.height
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Rasterizes onto `pixels` with logical coordinates multiplied by `scale`.
    pub fn render(&self, pixels: &mut RgbaBuffer, scale: i32) {
        let clip = pixels.bounds();
        match self {
            Self::Rectangle { rect, style } => {
                let area = rect.scaled(scale);
                raster::fill_rect(pixels, area, style.fill, clip);
                if style.border_thickness > 0 {
                    raster::stroke_rect(
                        pixels,
                        area,
                        style.border_color(),
                        style.border_thickness as u32,
                        clip,
                    );
                }
            }
            Self::Ellipse { rect, style } => {
                let area = rect.scaled(scale);
                raster::fill_ellipse(pixels, area, style.fill, clip);
                if style.border_thickness > 0 {
                    raster::stroke_ellipse(
                        pixels,
                        area,
                        style.border_color(),
                        style.border_thickness as u32,
                        clip,
                    );
                }
            }
            Self::Polygon {
                origin,
                vertices,
                radius,
                rotation,
                style,
            } => {
                let points = polygon_vertices(*origin, *vertices, *radius, *rotation, scale);
                raster::fill_polygon(pixels, &points, style.fill, clip);
                if style.border_thickness > 0 {
                    raster::stroke_polygon(
                        pixels,
                        &points,
                        style.border_color(),
                        style.border_thickness as u32,
                        clip,
                    );
                }
            }
            Self::Line {
                geometry,
                color,
                thickness,
            } => {
                let (start, end) = line_endpoints(geometry, scale);
                raster::draw_segment(pixels, start, end, *color, *thickness as u32, clip);
            }
            Self::Bezier {
                points,
                color,
                thickness,
            } => raster::draw_bezier(pixels, *points, *color, *thickness as u32, clip),
            Self::Text {
                text,
                point_size,
                color,
                placement,
            } => {
                let area = match placement {
                    TextPlacement::FullCanvas => clip,
                    TextPlacement::Bounded(bounds) => bounds.scaled(scale),
                };
                text::draw_text(pixels, text, *point_size, *color, area, clip);
            }
        }
    }
}

fn check_border(style: &BoxStyle) -> Result<()> {
    if style.border_thickness < 0 {
        return Err(invalid(format!(
            "border thickness {} is negative",
            style.border_thickness
        )));
    }
    Ok(())
}

fn check_thickness(thickness: i32) -> Result<()> {
    if thickness < 1 {
        return Err(invalid(format!(
            "line thickness {thickness} must be at least 1"
        )));
    }
    Ok(())
}

/// Raw pixel vertices of a regular polygon inscribed in the circle of
/// `radius` whose bounding square starts at `origin`. Coordinates past the
/// `i32` range saturate.
pub fn polygon_vertices(
    origin: Point,
    vertices: i32,
    radius: i32,
    rotation: f64,
    scale: i32,
) -> Vec<Point> {
    let scale = f64::from(scale);
    let reach = f64::from(radius) * scale;
    let cx = (f64::from(origin.x) + f64::from(radius)) * scale;
    let cy = (f64::from(origin.y) + f64::from(radius)) * scale;
    (0..vertices.max(0))
        .map(|i| {
            let angle = TAU * f64::from(i) / f64::from(vertices) + rotation;
            Point::new(
                (cx + (angle.sin() * reach).trunc()) as i32,
                (cy - (angle.cos() * reach).trunc()) as i32,
            )
        })
        .collect()
}

/// Raw pixel endpoints; polar lines are resolved against the current scale.
pub fn line_endpoints(geometry: &LineGeometry, scale: i32) -> (Point, Point) {
    match *geometry {
        LineGeometry::Points { start, end } => (start.scaled(scale), end.scaled(scale)),
        LineGeometry::Polar {
            start,
            length,
            rotation,
        } => {
            let reach = length * f64::from(scale);
            let heading = -rotation - PI;
            let origin = start.scaled(scale);
            (
                origin,
                Point::new(
                    (f64::from(origin.x) + (heading.sin() * reach).trunc()) as i32,
                    (f64::from(origin.y) + (heading.cos() * reach).trunc()) as i32,
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawer::error::DrawerError;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn far_away_geometry_saturates() {
        let points = polygon_vertices(Point::new(i32::MAX - 5, 0), 4, 1000, 0.0, 10);
        assert!(points.iter().all(|p| p.x == i32::MAX));
        let (start, end) = line_endpoints(
            &LineGeometry::Points {
                start: Point::new(i32::MIN, 0),
                end: Point::new(i32::MAX, 0),
            },
            3,
        );
        assert_eq!((start.x, end.x), (i32::MIN, i32::MAX));
    }

    #[test]
    fn far_away_shapes_render_without_panicking() {
        let mut pixels = RgbaBuffer::new(50, 50, Color::BLACK);
        let shapes = [
            Shape::rectangle(i32::MAX - 5, 0, 10, 10, BoxStyle::outlined(Color::RED, 3, Color::RED)),
            Shape::ellipse(i32::MIN, i32::MIN, i32::MAX, i32::MAX, BoxStyle::filled(Color::RED)),
            Shape::polygon(i32::MAX - 5, i32::MAX - 5, 7, i32::MAX, 0.5, BoxStyle::default()),
            Shape::polar_line(Point::new(0, 0), 1.0e300, 1.0, Color::RED, 2),
            Shape::text("far", 1.0e9, None),
        ];
        for shape in shapes {
            shape.unwrap().render(&mut pixels, 20);
        }
    }

    #[test]
    fn square_polygon_is_a_diamond() {
        let points = polygon_vertices(Point::new(0, 0), 4, 10, 0.0, 1);
        assert_eq!(
            points,
            vec![
                Point::new(10, 0),
                Point::new(20, 10),
                Point::new(10, 20),
                Point::new(0, 10),
            ]
        );
    }

    #[test]
    fn polygon_vertices_follow_scale() {
        let points = polygon_vertices(Point::new(1, 1), 4, 10, 0.0, 2);
        assert_eq!(points[0], Point::new(22, 2));
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn polar_line_points_north_then_clockwise() {
        let north = LineGeometry::Polar {
            start: Point::new(50, 50),
            length: 20.0,
            rotation: 0.0,
        };
        assert_eq!(line_endpoints(&north, 1).1, Point::new(50, 30));

        let east = LineGeometry::Polar {
            start: Point::new(50, 50),
            length: 20.0,
            rotation: FRAC_PI_2,
        };
        assert_eq!(line_endpoints(&east, 1).1, Point::new(70, 50));
        assert_eq!(line_endpoints(&east, 2).1, Point::new(140, 100));
    }

    #[test]
    fn degenerate_boxes_are_rejected() {
        for result in [
            Shape::rectangle(0, 0, 0, 5, BoxStyle::default()),
            Shape::rectangle(0, 0, 5, -1, BoxStyle::default()),
            Shape::ellipse(0, 0, 0, 0, BoxStyle::default()),
            Shape::rectangle(0, 0, 5, 5, BoxStyle::outlined(Color::RED, -1, Color::RED)),
        ] {
            assert!(matches!(result, Err(DrawerError::InvalidArgument(_))));
        }
    }

    #[test]
    fn polygons_need_three_vertices() {
        assert!(Shape::polygon(0, 0, 2, 10, 0.0, BoxStyle::default()).is_err());
        assert!(Shape::polygon(0, 0, 3, 10, 0.0, BoxStyle::default()).is_ok());
        assert!(Shape::polygon(0, 0, 5, -1, 0.0, BoxStyle::default()).is_err());
    }

    #[test]
    fn lines_need_positive_thickness() {
        let a = Point::new(0, 0);
        let b = Point::new(5, 5);
        assert!(Shape::line(a, b, Color::RED, 0).is_err());
        assert!(Shape::line(a, b, Color::RED, 1).is_ok());
        assert!(Shape::polar_line(a, -1.0, 0.0, Color::RED, 1).is_err());
        assert!(Shape::bezier([a, b, a, b], Color::RED, 0).is_err());
    }

    #[test]
    fn text_defaults_depend_on_placement() {
        let Shape::Text { color, .. } = Shape::text("x", 10.0, None).unwrap() else {
            panic!("expected text");
        };
        assert_eq!(color, DEFAULT_CANVAS_TEXT_COLOR);
        let Shape::Text { color, .. } =
            Shape::bounded_text("x", 10.0, PixelRect::new(0, 0, 5, 5), None).unwrap()
        else {
            panic!("expected text");
        };
        assert_eq!(color, DEFAULT_BOUNDED_TEXT_COLOR);
        assert!(Shape::text("x", 0.5, None).is_err());
    }

    #[test]
    fn centered_rectangle_anchors_at_half_size() {
        let shape = Shape::centered_rectangle(50, 50, 21, 10, BoxStyle::default()).unwrap();
        assert_eq!(
            shape,
            Shape::Rectangle {
                rect: PixelRect::new(40, 45, 21, 10),
                style: BoxStyle::default(),
            }
        );
    }

    #[test]
    fn rectangle_border_defaults_to_fill() {
        let mut pixels = RgbaBuffer::new(40, 40, Color::BLACK);
        let style = BoxStyle {
            fill: Color::RED,
            border_thickness: 2,
            border: None,
        };
        Shape::rectangle(10, 10, 10, 10, style)
            .unwrap()
            .render(&mut pixels, 1);
        assert_eq!(pixels.pixel(9, 9), Some(Color::RED));
        assert_eq!(pixels.pixel(15, 15), Some(Color::RED));
    }

    #[test]
    fn bezier_ignores_scale() {
        let points = [
            Point::new(1, 1),
            Point::new(1, 1),
            Point::new(3, 1),
            Point::new(3, 1),
        ];
        let mut pixels = RgbaBuffer::new(20, 20, Color::BLACK);
        Shape::bezier(points, Color::WHITE, 1)
            .unwrap()
            .render(&mut pixels, 4);
        assert_eq!(pixels.pixel(2, 1), Some(Color::WHITE));
        assert_eq!(pixels.pixel(8, 4), Some(Color::BLACK));
    }
}
