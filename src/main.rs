use gdi_drawer::demos::{run_demo, DEMOS};
use gdi_drawer::logging;
use gdi_drawer::settings::DrawerSettings;

const SETTINGS_FILE: &str = "drawer.json";

fn usage() {
    eprintln!("usage: drawer_demo <demo> [argument]");
    for (name, about) in DEMOS {
        eprintln!("  {name:<12} {about}");
    }
}

fn main() -> anyhow::Result<()> {
    let settings = DrawerSettings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging, settings.log_file.clone());

    let mut args = std::env::args().skip(1);
    let Some(name) = args.next() else {
        usage();
        return Ok(());
    };
    let argument = args.next();
    if let Err(err) = run_demo(&name, argument.as_deref(), &settings) {
        tracing::error!(demo = %name, "demo failed: {err:#}");
        return Err(err);
    }
    Ok(())
}
