pub mod console;
pub mod demos;
pub mod drawer;
pub mod logging;
pub mod palette;
pub mod settings;
