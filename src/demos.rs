use std::f64::consts::{PI, TAU};
use std::io::BufRead;
use std::path::Path;
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use rand::Rng;

use crate::drawer::{BoxStyle, Color, CoordSpace, Drawer, MouseKind, PixelRect, Point, RgbaBuffer};
use crate::palette::{random_color, random_known_color};
use crate::settings::DrawerSettings;

pub const DEMOS: &[(&str, &str)] = &[
    ("clicks", "1000 tiny random ellipses at scale 20, then ten left clicks"),
    ("centered", "centered rectangles with random borders"),
    ("positions", "two windows moved side by side"),
    ("lines", "straight and polar lines"),
    ("polar", "a rotating fan of polar lines"),
    ("subscribers", "draw from mouse move and left click handlers"),
    ("bezier", "fans of bezier curves"),
    ("blocks", "random ellipses, polygons, rectangles and text"),
    ("grid", "scaled line grid with text"),
    ("pixels", "random back-buffer pixels, raw then scaled"),
    ("shapes", "timed random shapes and centered ellipses"),
    ("background", "load an image file into the back-buffer: background <path>"),
];

pub fn run_demo(name: &str, arg: Option<&str>, base: &DrawerSettings) -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();
    tracing::info!(demo = name, "starting demo");
    match name {
        "clicks" => clicks(base, &mut rng),
        "centered" => centered_rectangles(base, &mut rng),
        "positions" => positions(base),
        "lines" => lines(base, &mut rng),
        "polar" => polar(base, &mut rng),
        "subscribers" => subscribers(base),
        "bezier" => bezier(base),
        "blocks" => blocks(base, &mut rng),
        "grid" => grid(base, &mut rng),
        "pixels" => pixels(base, &mut rng),
        "shapes" => timed_shapes(base, &mut rng),
        "background" => {
            let path = arg.ok_or_else(|| anyhow!("background needs an image path"))?;
            background(base, Path::new(path))
        }
        other => bail!("unknown demo '{other}'"),
    }
}

fn open(base: &DrawerSettings, width: u32, height: u32, continuous: bool) -> anyhow::Result<Drawer> {
    let settings = DrawerSettings {
        width,
        height,
        continuous_update: continuous,
        scale: 1,
        ..base.clone()
    };
    Ok(Drawer::with_settings(settings)?)
}

fn wait_for_enter(prompt: &str) -> anyhow::Result<()> {
    println!("{prompt}");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

fn clicks(base: &DrawerSettings, rng: &mut impl Rng) -> anyhow::Result<()> {
    let dr = open(base, 800, 600, true)?;
    dr.set_background(Color::WHITE);
    dr.set_scale(20)?;
    dr.set_continuous_update(false);
    for _ in 0..1000 {
        let x = rng.gen_range(0..dr.scaled_width());
        let y = rng.gen_range(0..dr.scaled_height());
        dr.add_ellipse(x, y, 1, 1, BoxStyle::filled(random_color(rng)))?;
        dr.render();
    }

    dr.set_scale(1)?;
    dr.set_continuous_update(true);
    let mut accepted = 0;
    let mut polls: u64 = 0;
    while accepted < 10 && dr.is_running() {
        let click = dr.last_left_click();
        if click.is_new {
            accepted += 1;
            dr.add_ellipse(click.point.x - 10, click.point.y - 10, 20, 20, BoxStyle::default())?;
        } else {
            polls += 1;
            sleep(Duration::from_millis(1));
        }
    }
    println!("Checked for coordinates {polls} times!");
    wait_for_enter("press enter to close")
}

fn centered_rectangles(base: &DrawerSettings, rng: &mut impl Rng) -> anyhow::Result<()> {
    let dr = open(base, 800, 600, false)?;
    dr.add_centered_rectangle(400, 300, 796, 596, BoxStyle::filled(Color::RED))?;
    for _ in 0..500 {
        let style = BoxStyle::outlined(random_color(rng), rng.gen_range(0..6), random_color(rng));
        dr.add_centered_rectangle(
            rng.gen_range(100..700),
            rng.gen_range(100..500),
            rng.gen_range(5..190),
            rng.gen_range(5..190),
            style,
        )?;
    }
    dr.render();
    wait_for_enter("press enter to close")
}

fn positions(base: &DrawerSettings) -> anyhow::Result<()> {
    let a = open(base, 200, 200, true)?;
    let b = open(base, 200, 300, true)?;
    wait_for_enter("press enter to line the windows up")?;
    a.set_position(Point::new(100, 50));
    let a_pos = a.position().unwrap_or(Point::new(100, 50));
    let a_width = a.window_size().map(|(w, _)| w).unwrap_or(200);
    b.set_position(Point::new(a_pos.x + a_width + 10, 50));
    wait_for_enter("press enter to close")
}

fn lines(base: &DrawerSettings, rng: &mut impl Rng) -> anyhow::Result<()> {
    let dr = open(base, 800, 600, false)?;
    dr.add_line(Point::new(10, 10), Point::new(790, 590), Color::RED, 2)?;
    let mut angle = 0.0;
    while angle < TAU {
        dr.add_polar_line(Point::new(400, 300), 50.0 * angle, angle, Color::GRAY, 1)?;
        angle += PI / 32.0;
    }
    for x in (0..600).step_by(5) {
        dr.add_line(Point::new(0, 600 - x), Point::new(x, 0), random_color(rng), 1)?;
    }
    dr.render();
    wait_for_enter("press enter to close")
}

fn polar(base: &DrawerSettings, rng: &mut impl Rng) -> anyhow::Result<()> {
    let dr = open(base, 600, 600, true)?;
    let centre = Point::new(300, 300);
    let mut turn = 0.0;
    while turn < TAU && dr.is_running() {
        let color = random_known_color(rng);
        for spoke in 0..12 {
            let rotation = turn + f64::from(spoke) * TAU / 12.0;
            dr.add_polar_line(centre, 280.0, rotation, color, 1)?;
        }
        turn += PI / 90.0;
        sleep(Duration::from_millis(20));
    }
    wait_for_enter("press enter to close")
}

fn subscribers(base: &DrawerSettings) -> anyhow::Result<()> {
    let dr = open(base, 800, 600, true)?;
    dr.on_mouse(MouseKind::Move, CoordSpace::Raw, |pos, canvas| {
        let _ = canvas.add_ellipse(pos.x, pos.y, 5, 5, BoxStyle::filled(Color::RED));
    });
    dr.on_mouse(MouseKind::LeftClick, CoordSpace::Raw, |pos, canvas| {
        let _ = canvas.add_ellipse(pos.x, pos.y, 10, 10, BoxStyle::filled(Color::YELLOW));
    });
    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(10) && dr.is_running() {
        sleep(Duration::from_millis(10));
    }
    Ok(())
}

fn bezier(base: &DrawerSettings) -> anyhow::Result<()> {
    let dr = open(base, 800, 600, false)?;
    for ix in (0..800).step_by(50) {
        let rising = [
            Point::new(0, 600),
            Point::new(ix, 0),
            Point::new(800 - ix, 600),
            Point::new(800, 0),
        ];
        let falling = [
            Point::new(0, 0),
            Point::new(ix, 0),
            Point::new(800 - ix, 600),
            Point::new(800, 600),
        ];
        dr.add_bezier(rising, Color::RED, 2)?;
        dr.add_bezier(falling, Color::RED, 2)?;
    }
    dr.render();
    wait_for_enter("press enter to close")
}

fn blocks(base: &DrawerSettings, rng: &mut impl Rng) -> anyhow::Result<()> {
    let dr = open(base, 800, 600, false)?;
    for _ in 0..50 {
        let size = (rng.gen_range(1..800), rng.gen_range(1..800));
        let style = BoxStyle::outlined(random_color(rng), 1, random_color(rng));
        dr.add_centered_ellipse(rng.gen_range(0..800), rng.gen_range(0..800), size.0, size.1, style)?;
        dr.add_ellipse(
            rng.gen_range(0..800),
            rng.gen_range(0..800),
            rng.gen_range(1..800),
            rng.gen_range(1..800),
            BoxStyle::filled(random_color(rng)),
        )?;
        dr.add_polygon(
            rng.gen_range(0..800),
            rng.gen_range(0..800),
            rng.gen_range(3..64),
            rng.gen_range(0..300),
            rng.gen::<f64>() * TAU,
            BoxStyle::outlined(random_color(rng), 1, random_color(rng)),
        )?;
        dr.add_rectangle(
            rng.gen_range(-10..810),
            rng.gen_range(-10..610),
            rng.gen_range(1..810),
            rng.gen_range(1..610),
            BoxStyle::outlined(random_color(rng), 1, random_color(rng)),
        )?;
        let bounds = PixelRect::new(
            rng.gen_range(0..800),
            rng.gen_range(0..600),
            rng.gen_range(0..200),
            rng.gen_range(0..200),
        );
        dr.add_text_in("Rats", rng.gen_range(1..100) as f32, bounds, Some(random_color(rng)))?;
        dr.add_text("Rats", rng.gen_range(1..100) as f32, Some(random_color(rng)))?;
    }
    dr.render();
    wait_for_enter("press enter to close")
}

fn grid(base: &DrawerSettings, rng: &mut impl Rng) -> anyhow::Result<()> {
    let dr = open(base, 800, 600, false)?;
    dr.set_scale(10)?;
    for i in (0..dr.scaled_width()).step_by(5) {
        for j in (0..dr.scaled_height()).step_by(5) {
            let end = Point::new(dr.scaled_width() + 1 - i, dr.scaled_height() + 1 - j);
            dr.add_line(Point::new(i, j), end, random_known_color(rng), 1)?;
        }
    }
    dr.add_text("check...check.. ", 48.0, None)?;
    dr.add_text_in("one two three", 12.0, PixelRect::new(-10, -10, 100, 50), Some(Color::WHITE))?;
    dr.render();
    wait_for_enter("press enter to close")
}

fn pixels(base: &DrawerSettings, rng: &mut impl Rng) -> anyhow::Result<()> {
    let dr = open(base, 800, 600, true)?;
    let caption = "Random Known Colors SetPixel : 2s";
    let full = PixelRect::new(0, 0, dr.scaled_width(), dr.scaled_height());
    dr.add_text_in(caption, 28.0, full, Some(Color::WHITE))?;
    let shadow = PixelRect::new(2, 2, dr.scaled_width() + 2, dr.scaled_height() + 2);
    dr.add_text_in(caption, 28.0, shadow, Some(Color::BLACK))?;
    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(2) {
        let x = rng.gen_range(0..dr.scaled_width());
        let y = rng.gen_range(0..dr.scaled_height());
        dr.set_pixel(x, y, random_known_color(rng))?;
    }

    dr.clear();
    dr.set_scale(10)?;
    dr.add_text("Random Known Colors SetScaledPixel : 2s", 24.0, None)?;
    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(2) {
        let x = rng.gen_range(0..dr.scaled_width());
        let y = rng.gen_range(0..dr.scaled_height());
        dr.set_scaled_pixel(x, y, random_known_color(rng))?;
        sleep(Duration::from_millis(1));
    }
    Ok(())
}

fn timed_shapes(base: &DrawerSettings, rng: &mut impl Rng) -> anyhow::Result<()> {
    let caption = "Random Bounding Box Shapes : 5s";
    {
        let dr = open(base, 800, 600, true)?;
        add_caption(&dr, caption)?;
        let started = Instant::now();
        while started.elapsed() < Duration::from_secs(5) && dr.is_running() {
            let p = Point::new(
                rng.gen_range(-50..dr.scaled_width() + 50),
                rng.gen_range(-50..dr.scaled_height() - 50),
            );
            let style = BoxStyle::outlined(
                random_known_color(rng),
                rng.gen_range(1..4),
                random_known_color(rng),
            );
            match rng.gen_range(0..6) {
                0 => dr.add_ellipse(p.x, p.y, 100, 100, BoxStyle::default())?,
                1 => dr.add_ellipse(p.x, p.y, 100, 100, style)?,
                2 => dr.add_polygon(p.x, p.y, rng.gen_range(3..8), 50, 0.0, BoxStyle::default())?,
                3 => dr.add_polygon(p.x, p.y, rng.gen_range(3..8), 50, rng.gen::<f64>() * PI, style)?,
                4 => dr.add_rectangle(p.x, p.y, 100, 100, BoxStyle::default())?,
                _ => dr.add_rectangle(p.x, p.y, 100, 100, style)?,
            }
            sleep(Duration::from_millis(100));
        }
    }

    let dr = open(base, 1000, 400, false)?;
    add_caption(&dr, "Random Centered Ellipses : 2s")?;
    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(2) {
        let p = Point::new(
            rng.gen_range(50..dr.scaled_width() - 50),
            rng.gen_range(50..dr.scaled_height() - 50),
        );
        dr.add_centered_ellipse(p.x, p.y, 100, 100, BoxStyle::outlined(random_known_color(rng), 2, Color::WHITE))?;
        dr.add_centered_ellipse(p.x, p.y, 5, 5, BoxStyle::outlined(random_known_color(rng), 1, Color::RED))?;
        sleep(Duration::from_millis(100));
    }
    dr.render();
    sleep(Duration::from_secs(1));
    Ok(())
}

fn add_caption(dr: &Drawer, caption: &str) -> anyhow::Result<()> {
    let full = PixelRect::new(0, 0, dr.scaled_width(), dr.scaled_height());
    dr.add_text_in(caption, 28.0, full, Some(Color::WHITE))?;
    let shadow = PixelRect::new(2, 2, dr.scaled_width() + 2, dr.scaled_height() + 2);
    dr.add_text_in(caption, 28.0, shadow, Some(Color::BLACK))?;
    Ok(())
}

fn background(base: &DrawerSettings, path: &Path) -> anyhow::Result<()> {
    let image = image::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    let picture = RgbaBuffer::from_pixels(width, height, image.into_raw())?;
    let dr = open(base, width, height, false)?;
    dr.with_pixels(|pixels| pixels.copy_from(&picture))?;
    dr.render();
    sleep(Duration::from_secs(1));
    wait_for_enter("press enter to close")
}
