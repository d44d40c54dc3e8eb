use halo_player::playlist::Playlist;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_resolves_sources_against_playlist_dir() {
    let temp_dir = TempDir::new().unwrap();
    let playlist_path = temp_dir.path().join("set.toml");
    fs::write(
        &playlist_path,
        r##"
[[track]]
src = "audio/one.wav"
title = "One"
color = "#ff0000"

[[track]]
src = "/srv/music/two.flac"

[[track]]
title = "Placeholder"
"##,
    )
    .unwrap();

    let playlist = Playlist::load(&playlist_path).unwrap();
    assert_eq!(playlist.len(), 3);

    let first = PathBuf::from(playlist.get(0).unwrap().src.as_deref().unwrap());
    assert_eq!(first, temp_dir.path().join("audio/one.wav"));

    assert_eq!(
        playlist.get(1).unwrap().src.as_deref(),
        Some("/srv/music/two.flac")
    );
    assert!(playlist.get(2).unwrap().src.is_none());
}

#[test]
fn test_load_expands_environment_variables() {
    let temp_dir = TempDir::new().unwrap();
    let playlist_path = temp_dir.path().join("env.toml");
    fs::write(&playlist_path, "[[track]]\nsrc = \"$HALO_TEST_MUSIC/song.wav\"\n").unwrap();

    unsafe {
        std::env::set_var("HALO_TEST_MUSIC", "/data/music");
    }
    let playlist = Playlist::load(&playlist_path).unwrap();
    assert_eq!(
        playlist.get(0).unwrap().src.as_deref(),
        Some("/data/music/song.wav")
    );
}

#[test]
fn test_load_missing_file() {
    let result = Playlist::load(std::path::Path::new("/nonexistent/playlist.toml"));
    let err = result.unwrap_err().to_string();
    assert!(err.contains("Cannot read playlist"));
}

#[test]
fn test_extra_keys_ignored_wrong_types_rejected() {
    assert!(Playlist::parse("[[track]]\nsrc = \"a.wav\"\nrating = 5\n").is_ok());
    assert!(Playlist::parse("[[track]]\nsrc = 5\n").is_err());
}
