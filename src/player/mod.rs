pub mod app;
pub mod audio;
pub mod ui;

use std::error::Error;
use std::path::Path;

pub fn run(playlist: &Path, track: Option<usize>) -> Result<(), Box<dyn Error>> {
    app::run(playlist, track)
}
