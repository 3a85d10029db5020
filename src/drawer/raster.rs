use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::model::{Color, PixelRect, Point};

/// Strokes at least this thick are rasterized as capsules instead of stamped.
const CAPSULE_THRESHOLD: u32 = 6;

/// Line from `start` to `end` with round caps. Only the part of the line
/// that can touch `clip` is stepped.
pub fn draw_segment(
    pixels: &mut RgbaBuffer,
    start: Point,
    end: Point,
    color: Color,
    thickness: u32,
    clip: PixelRect,
) {
    let thickness = thickness.clamp(1, i32::MAX as u32);
    let reach = (thickness / 2) as i32 + 1;
    let Some((start, end)) = clip_segment(start, end, clip.inflate(reach)) else {
        return;
    };
    if thickness >= CAPSULE_THRESHOLD && start != end {
        draw_segment_capsule(pixels, start, end, color, thickness, clip);
        return;
    }

    let mut x0 = start.x;
    let mut y0 = start.y;
    let dx = (end.x - x0).abs();
    let sx = if x0 < end.x { 1 } else { -1 };
    let dy = -(end.y - y0).abs();
    let sy = if y0 < end.y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        draw_brush(pixels, Point::new(x0, y0), color, thickness, clip);
        if x0 == end.x && y0 == end.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Liang-Barsky clip of a segment against the pixel rows and columns of
/// `bounds`. Endpoints already inside are returned unchanged.
fn clip_segment(start: Point, end: Point, bounds: PixelRect) -> Option<(Point, Point)> {
    if bounds.is_empty() {
        return None;
    }
    if bounds.contains(start.x, start.y) && bounds.contains(end.x, end.y) {
        return Some((start, end));
    }
    let (x0, y0) = (f64::from(start.x), f64::from(start.y));
    let dx = f64::from(end.x) - x0;
    let dy = f64::from(end.y) - y0;
    let min_x = f64::from(bounds.x);
    let max_x = f64::from(bounds.right()) - 1.0;
    let min_y = f64::from(bounds.y);
    let max_y = f64::from(bounds.bottom()) - 1.0;

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - min_x),
        (dx, max_x - x0),
        (-dy, y0 - min_y),
        (dy, max_y - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| {
        Point::new(
            (x0 + dx * t).round().clamp(min_x, max_x) as i32,
            (y0 + dy * t).round().clamp(min_y, max_y) as i32,
        )
    };
    let clipped_start = if t0 > 0.0 { at(t0) } else { start };
    let clipped_end = if t1 < 1.0 { at(t1) } else { end };
    Some((clipped_start, clipped_end))
}

fn draw_segment_capsule(
    pixels: &mut RgbaBuffer,
    start: Point,
    end: Point,
    color: Color,
    thickness: u32,
    clip: PixelRect,
) {
    let radius = f64::from(thickness) * 0.5;
    let pad = (radius.ceil() as i32).saturating_add(1);
    let bounds = PixelRect::new(
        start.x.min(end.x),
        start.y.min(end.y),
        span_of(start.x, end.x),
        span_of(start.y, end.y),
    )
    .inflate(pad);
    let Some(area) = bounds.intersect(clip) else {
        return;
    };

    let radius_sq = radius * radius;
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if point_segment_distance_sq(Point::new(x, y), start, end) <= radius_sq {
                pixels.put(x, y, color);
            }
        }
    }
}

fn span_of(a: i32, b: i32) -> i32 {
    a.abs_diff(b).min(i32::MAX as u32 - 1) as i32 + 1
}

fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f64 {
    let px = f64::from(point.x);
    let py = f64::from(point.y);
    let x0 = f64::from(start.x);
    let y0 = f64::from(start.y);
    let vx = f64::from(end.x) - x0;
    let vy = f64::from(end.y) - y0;
    let len_sq = vx * vx + vy * vy;
    if len_sq == 0.0 {
        let dx = px - x0;
        let dy = py - y0;
        return dx * dx + dy * dy;
    }
    let t = (((px - x0) * vx + (py - y0) * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    dx * dx + dy * dy
}

/// Round brush of diameter `thickness` centered on `center`.
fn draw_brush(pixels: &mut RgbaBuffer, center: Point, color: Color, thickness: u32, clip: PixelRect) {
    let radius = thickness as f32 * 0.5;
    let reach = radius.floor() as i32;
    let Some(area) = PixelRect::new(center.x, center.y, 1, 1)
        .inflate(reach)
        .intersect(clip)
    else {
        return;
    };
    let radius_sq = f64::from(radius) * f64::from(radius);
    for y in area.y..area.bottom() {
        let dy = i64::from(y) - i64::from(center.y);
        for x in area.x..area.right() {
            let dx = i64::from(x) - i64::from(center.x);
            if ((dx * dx + dy * dy) as f64) <= radius_sq {
                pixels.put(x, y, color);
            }
        }
    }
}

pub fn fill_rect(pixels: &mut RgbaBuffer, rect: PixelRect, color: Color, clip: PixelRect) {
    if let Some(area) = rect.intersect(clip) {
        let _ = pixels.fill_rect(area, color);
    }
}

/// Outline of `thickness` pixels centered on the rectangle's edge pixels.
pub fn stroke_rect(
    pixels: &mut RgbaBuffer,
    rect: PixelRect,
    color: Color,
    thickness: u32,
    clip: PixelRect,
) {
    if rect.is_empty() || thickness == 0 {
        return;
    }
    let t = thickness.min(i32::MAX as u32) as i32;
    let lo = t / 2;
    let left = rect.x.saturating_sub(lo);
    let top = rect.y.saturating_sub(lo);
    let right = rect.right().saturating_sub(1).saturating_sub(lo);
    let bottom = rect.bottom().saturating_sub(1).saturating_sub(lo);
    let span_w = (rect.width - 1).saturating_add(t);
    let span_h = (rect.height - 1).saturating_add(t);
    fill_rect(pixels, PixelRect::new(left, top, span_w, t), color, clip);
    fill_rect(pixels, PixelRect::new(left, bottom, span_w, t), color, clip);
    fill_rect(pixels, PixelRect::new(left, top, t, span_h), color, clip);
    fill_rect(pixels, PixelRect::new(right, top, t, span_h), color, clip);
}

/// Solid ellipse inscribed in `rect`, sampled at pixel centers.
pub fn fill_ellipse(pixels: &mut RgbaBuffer, rect: PixelRect, color: Color, clip: PixelRect) {
    if rect.is_empty() {
        return;
    }
    let rx = f64::from(rect.width) * 0.5;
    let ry = f64::from(rect.height) * 0.5;
    let cx = f64::from(rect.x) + rx;
    let cy = f64::from(rect.y) + ry;
    let Some(rows) = rect.intersect(clip) else {
        return;
    };
    for y in rows.y..rows.bottom() {
        if let Some((x0, x1)) = ellipse_span(f64::from(y) + 0.5 - cy, cx, rx, ry) {
            pixels.fill_span(y, x0, x1, color, clip);
        }
    }
}

/// Ellipse outline of `thickness` pixels centered on the ellipse through the
/// edge pixels of `rect`, filled row by row as the ring between two ellipses.
pub fn stroke_ellipse(
    pixels: &mut RgbaBuffer,
    rect: PixelRect,
    color: Color,
    thickness: u32,
    clip: PixelRect,
) {
    if rect.is_empty() || thickness == 0 {
        return;
    }
    let half = f64::from(thickness) * 0.5;
    let rx = f64::from(rect.width - 1) * 0.5;
    let ry = f64::from(rect.height - 1) * 0.5;
    let cx = f64::from(rect.x) + rx + 0.5;
    let cy = f64::from(rect.y) + ry + 0.5;
    let (outer_rx, outer_ry) = (rx + half, ry + half);
    let (inner_rx, inner_ry) = (rx - half, ry - half);

    let outer = PixelRect::new(rect.x, rect.y, rect.width, rect.height)
        .inflate(half.ceil().min(f64::from(i32::MAX)) as i32);
    let Some(rows) = outer.intersect(clip) else {
        return;
    };
    for y in rows.y..rows.bottom() {
        let dy = f64::from(y) + 0.5 - cy;
        let Some((x0, x1)) = ellipse_span(dy, cx, outer_rx, outer_ry) else {
            continue;
        };
        let hole = if inner_rx > 0.0 && inner_ry > 0.0 {
            ellipse_span(dy, cx, inner_rx, inner_ry)
        } else {
            None
        };
        match hole {
            Some((h0, h1)) => {
                if h0 > x0 {
                    pixels.fill_span(y, x0, h0 - 1, color, clip);
                }
                if h1 < x1 {
                    pixels.fill_span(y, h1 + 1, x1, color, clip);
                }
            }
            None => pixels.fill_span(y, x0, x1, color, clip),
        }
    }
}

/// Pixel columns whose centers lie inside the ellipse on the row `dy` below
/// its center.
fn ellipse_span(dy: f64, cx: f64, rx: f64, ry: f64) -> Option<(i32, i32)> {
    if rx <= 0.0 || ry <= 0.0 {
        return None;
    }
    let ratio = dy / ry;
    let inside = 1.0 - ratio * ratio;
    if inside < 0.0 {
        return None;
    }
    let half = rx * inside.sqrt();
    let x0 = (cx - half - 0.5).ceil();
    let x1 = (cx + half - 0.5).floor();
    if x1 < x0 {
        return None;
    }
    Some((x0 as i32, x1 as i32))
}

/// Even-odd scanline fill of a closed polygon.
pub fn fill_polygon(pixels: &mut RgbaBuffer, vertices: &[Point], color: Color, clip: PixelRect) {
    if vertices.len() < 3 {
        return;
    }
    let min_y = vertices.iter().map(|p| p.y).min().unwrap_or(0).max(clip.y);
    let max_y = vertices
        .iter()
        .map(|p| p.y)
        .max()
        .unwrap_or(0)
        .min(clip.bottom() - 1);

    let mut crossings: Vec<f32> = Vec::with_capacity(vertices.len());
    for y in min_y..=max_y {
        let sample = y as f32 + 0.5;
        crossings.clear();
        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            let (ay, by) = (a.y as f32, b.y as f32);
            if (ay <= sample && sample < by) || (by <= sample && sample < ay) {
                let t = (sample - ay) / (by - ay);
                crossings.push(a.x as f32 + t * (b.x as f32 - a.x as f32));
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for pair in crossings.chunks_exact(2) {
            let x0 = (pair[0] - 0.5).ceil() as i32;
            let x1 = ((pair[1] - 0.5).ceil() as i32).saturating_sub(1);
            if x1 >= x0 {
                pixels.fill_span(y, x0, x1, color, clip);
            }
        }
    }
}

pub fn stroke_polygon(
    pixels: &mut RgbaBuffer,
    vertices: &[Point],
    color: Color,
    thickness: u32,
    clip: PixelRect,
) {
    if vertices.len() < 2 || thickness == 0 {
        return;
    }
    for (i, start) in vertices.iter().enumerate() {
        let end = vertices[(i + 1) % vertices.len()];
        draw_segment(pixels, *start, end, color, thickness, clip);
    }
}

/// Cubic bezier flattened into short segments.
pub fn draw_bezier(
    pixels: &mut RgbaBuffer,
    points: [Point; 4],
    color: Color,
    thickness: u32,
    clip: PixelRect,
) {
    let hull: f32 = points
        .windows(2)
        .map(|pair| {
            let dx = pair[1].x as f32 - pair[0].x as f32;
            let dy = pair[1].y as f32 - pair[0].y as f32;
            (dx * dx + dy * dy).sqrt()
        })
        .sum();
    let steps = ((hull / 4.0).ceil() as usize).clamp(1, 512);
    let mut previous = points[0];
    for step in 1..=steps {
        let next = bezier_point(points, step as f32 / steps as f32);
        draw_segment(pixels, previous, next, color, thickness, clip);
        previous = next;
    }
}

fn bezier_point(points: [Point; 4], t: f32) -> Point {
    let u = 1.0 - t;
    let w0 = u * u * u;
    let w1 = 3.0 * u * u * t;
    let w2 = 3.0 * u * t * t;
    let w3 = t * t * t;
    let x = w0 * points[0].x as f32
        + w1 * points[1].x as f32
        + w2 * points[2].x as f32
        + w3 * points[3].x as f32;
    let y = w0 * points[0].y as f32
        + w1 * points[1].y as f32
        + w2 * points[2].y as f32
        + w3 * points[3].y as f32;
    Point::new(x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> RgbaBuffer {
        RgbaBuffer::new(40, 40, Color::BLACK)
    }

    fn lit(pixels: &RgbaBuffer) -> usize {
        let mut count = 0;
        for y in 0..pixels.height() as i32 {
            for x in 0..pixels.width() as i32 {
                if pixels.pixel(x, y) != Some(Color::BLACK) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn thin_horizontal_segment_covers_both_endpoints() {
        let mut pixels = canvas();
        let clip = pixels.bounds();
        draw_segment(&mut pixels, Point::new(2, 5), Point::new(12, 5), Color::WHITE, 1, clip);
        assert_eq!(lit(&pixels), 11);
        assert_eq!(pixels.pixel(2, 5), Some(Color::WHITE));
        assert_eq!(pixels.pixel(12, 5), Some(Color::WHITE));
    }

    #[test]
    fn wide_segment_has_round_caps() {
        let mut pixels = canvas();
        let clip = pixels.bounds();
        draw_segment(&mut pixels, Point::new(10, 20), Point::new(30, 20), Color::WHITE, 8, clip);
        assert_eq!(pixels.pixel(7, 20), Some(Color::WHITE));
        assert_eq!(pixels.pixel(7, 16), Some(Color::BLACK));
        assert_eq!(pixels.pixel(20, 16), Some(Color::WHITE));
    }

    #[test]
    fn segments_respect_clip_rect() {
        let mut pixels = canvas();
        let clip = PixelRect::new(0, 0, 10, 40);
        draw_segment(&mut pixels, Point::new(0, 3), Point::new(39, 3), Color::WHITE, 1, clip);
        assert_eq!(lit(&pixels), 10);
    }

    #[test]
    fn very_long_segment_only_steps_the_visible_part() {
        let mut pixels = RgbaBuffer::new(200, 150, Color::BLACK);
        let clip = pixels.bounds();
        draw_segment(
            &mut pixels,
            Point::new(0, 0),
            Point::new(20_000_000, 1),
            Color::WHITE,
            1,
            clip,
        );
        assert_eq!(pixels.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(pixels.pixel(199, 0), Some(Color::WHITE));
        assert_eq!(pixels.pixel(0, 1), Some(Color::BLACK));
        assert_eq!(lit(&pixels), 200);
    }

    #[test]
    fn segment_entirely_off_the_clip_draws_nothing() {
        let mut pixels = canvas();
        let clip = pixels.bounds();
        draw_segment(
            &mut pixels,
            Point::new(i32::MIN, -50),
            Point::new(i32::MAX, -50),
            Color::WHITE,
            3,
            clip,
        );
        assert_eq!(lit(&pixels), 0);
    }

    #[test]
    fn enormous_thickness_floods_the_clip() {
        let mut pixels = canvas();
        let clip = pixels.bounds();
        draw_segment(
            &mut pixels,
            Point::new(0, 0),
            Point::new(10, 10),
            Color::WHITE,
            i32::MAX as u32,
            clip,
        );
        assert_eq!(lit(&pixels), 40 * 40);
    }

    #[test]
    fn ellipse_outline_is_a_ring() {
        let mut pixels = canvas();
        let clip = pixels.bounds();
        stroke_ellipse(&mut pixels, PixelRect::new(10, 10, 20, 20), Color::WHITE, 1, clip);
        assert_eq!(pixels.pixel(19, 10), Some(Color::WHITE));
        assert_eq!(pixels.pixel(19, 9), Some(Color::BLACK));
        assert_eq!(pixels.pixel(10, 20), Some(Color::WHITE));
        assert_eq!(pixels.pixel(11, 20), Some(Color::BLACK));
        assert_eq!(pixels.pixel(20, 20), Some(Color::BLACK));
    }

    #[test]
    fn huge_ellipses_only_touch_visible_rows() {
        let huge = PixelRect::new(-1_000_000_000, -1_000_000_000, 2_000_000_000, 2_000_000_000);
        let mut filled = canvas();
        let clip = filled.bounds();
        fill_ellipse(&mut filled, huge, Color::WHITE, clip);
        assert_eq!(lit(&filled), 40 * 40);

        let mut outlined = canvas();
        stroke_ellipse(&mut outlined, huge, Color::WHITE, 1, clip);
        assert_eq!(lit(&outlined), 0);
    }

    #[test]
    fn polygon_fill_covers_interior_only() {
        let mut pixels = canvas();
        let clip = pixels.bounds();
        let square = [
            Point::new(5, 5),
            Point::new(15, 5),
            Point::new(15, 15),
            Point::new(5, 15),
        ];
        fill_polygon(&mut pixels, &square, Color::RED, clip);
        assert_eq!(lit(&pixels), 100);
        assert_eq!(pixels.pixel(5, 5), Some(Color::RED));
        assert_eq!(pixels.pixel(15, 15), Some(Color::BLACK));
    }

    #[test]
    fn ellipse_fill_stays_inside_bounding_box() {
        let mut pixels = canvas();
        let clip = pixels.bounds();
        fill_ellipse(&mut pixels, PixelRect::new(10, 10, 20, 10), Color::RED, clip);
        assert_eq!(pixels.pixel(20, 15), Some(Color::RED));
        assert_eq!(pixels.pixel(10, 10), Some(Color::BLACK));
        assert_eq!(pixels.pixel(29, 19), Some(Color::BLACK));
        assert_eq!(pixels.pixel(9, 15), Some(Color::BLACK));
    }

    #[test]
    fn rect_outline_is_centered_on_edges() {
        let mut pixels = canvas();
        let clip = pixels.bounds();
        stroke_rect(&mut pixels, PixelRect::new(10, 10, 10, 10), Color::WHITE, 2, clip);
        assert_eq!(pixels.pixel(9, 9), Some(Color::WHITE));
        assert_eq!(pixels.pixel(10, 10), Some(Color::WHITE));
        assert_eq!(pixels.pixel(11, 11), Some(Color::BLACK));
        assert_eq!(pixels.pixel(19, 19), Some(Color::WHITE));
    }

    #[test]
    fn bezier_passes_through_its_end_points() {
        let mut pixels = canvas();
        let clip = pixels.bounds();
        let points = [
            Point::new(2, 30),
            Point::new(10, 2),
            Point::new(25, 2),
            Point::new(35, 30),
        ];
        draw_bezier(&mut pixels, points, Color::WHITE, 1, clip);
        assert_eq!(pixels.pixel(2, 30), Some(Color::WHITE));
        assert_eq!(pixels.pixel(35, 30), Some(Color::WHITE));
        assert_eq!(pixels.pixel(18, 30), Some(Color::BLACK));
    }
}
