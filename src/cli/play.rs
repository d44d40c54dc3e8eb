use std::error::Error;
use std::path::Path;

pub fn handle_play(playlist: &Path, track: Option<usize>) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "player")]
    {
        crate::player::run(playlist, track)
    }

    #[cfg(not(feature = "player"))]
    {
        let _ = playlist;
        let _ = track;
        use owo_colors::OwoColorize;
        println!("{} {}", "◎".cyan(), "halo player".bold());
        println!();
        println!(
            "{} Playback requires the 'player' feature to be enabled.",
            "Note:".yellow()
        );
        println!();
        println!("To enable it, install with:");
        println!("  {}", "cargo install halo-player --features player".cyan());
        println!();
        println!("You can still validate a playlist with:");
        println!("  {}", "halo check <playlist>".cyan());

        Ok(())
    }
}
