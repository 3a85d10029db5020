use std::thread::sleep;
use std::time::Duration;

use rand::Rng;

use gdi_drawer::console::{canvas_size, ConsoleManager, COLUMNS, ROWS};
use gdi_drawer::drawer::{Color, Drawer};
use gdi_drawer::logging;
use gdi_drawer::palette::random_color;
use gdi_drawer::settings::DrawerSettings;

fn main() -> anyhow::Result<()> {
    let base = DrawerSettings::load("drawer.json")?;
    logging::init(base.debug_logging, base.log_file.clone());

    let (width, height) = canvas_size();
    let settings = DrawerSettings {
        width,
        height,
        continuous_update: true,
        scale: 1,
        title: "Drawer Console".to_string(),
        ..base
    };
    let drawer = Drawer::with_settings(settings)?;
    let mut console = ConsoleManager::new(drawer.canvas().clone());
    let mut rng = rand::thread_rng();
    let mut written: u64 = 0;

    while drawer.is_running() {
        console.fore = random_color(&mut rng);
        console.back = random_color(&mut rng);
        let code = rng.gen_range(b'!'..=b'~') as char;
        let x = rng.gen_range(0..COLUMNS);
        let y = rng.gen_range(0..ROWS - 1);
        if !console.write_char(x, y, code) {
            continue;
        }
        written += 1;
        if written % 100 == 0 {
            console.fore = Color::WHITE;
            console.back = Color::BLACK;
            console.set_pos(0, ROWS - 1);
            console.write_line(&format!("{written:>10} characters"));
            tracing::debug!(written, "console characters written");
        }
        sleep(Duration::from_millis(1));
    }
    tracing::info!(written, "console window closed");
    Ok(())
}
