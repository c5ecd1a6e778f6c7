// File: ./src/hymns.rs
// Ambient hymn playlist. Decoding and output are left to an external player.
use crate::config::HymnConfig;
use anyhow::{Context, Result};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "flac", "wav", "m4a", "opus"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HymnTrack {
    pub title: String,
    pub path: PathBuf,
}

/// Audio files in `dir`, titled by file name and sorted by title.
pub fn discover_tracks(dir: &Path) -> Vec<HymnTrack> {
    let Ok(entries) = fs::read_dir(dir) else {
        debug!("No hymn directory at {}", dir.display());
        return vec![];
    };
    let mut tracks: Vec<HymnTrack> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        })
        .filter_map(|path| {
            let title = path.file_stem()?.to_string_lossy().into_owned();
            Some(HymnTrack { title, path })
        })
        .collect();
    tracks.sort_by(|a, b| a.title.cmp(&b.title));
    tracks
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Start(usize),
    Pause,
    Resume,
    Nothing,
}

/// Which track plays and what the controls do next.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    len: usize,
    current: Option<usize>,
    started: bool,
    paused: bool,
    looping: bool,
    volume: f32,
}

impl Playlist {
    pub const DEFAULT_VOLUME: f32 = 0.2;

    pub fn new(len: usize, volume: f32) -> Self {
        Self {
            len,
            current: None,
            started: false,
            paused: false,
            looping: false,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }
    pub fn is_started(&self) -> bool {
        self.started
    }
    pub fn is_paused(&self) -> bool {
        self.paused
    }
    pub fn is_looping(&self) -> bool {
        self.looping
    }
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Random track, avoiding an immediate repeat when there is a choice.
    pub fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let mut idx = rng.random_range(0..self.len);
        if self.len > 1 && Some(idx) == self.current {
            idx = (idx + 1) % self.len;
        }
        Some(idx)
    }

    pub fn next_index(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        Some(self.current.map_or(0, |c| (c + 1) % self.len))
    }

    pub fn previous_index(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        Some(self.current.map_or(0, |c| (c + self.len - 1) % self.len))
    }

    fn start(&mut self, idx: Option<usize>) -> PlayerCommand {
        match idx {
            Some(i) => {
                self.current = Some(i);
                self.started = true;
                self.paused = false;
                PlayerCommand::Start(i)
            }
            None => PlayerCommand::Nothing,
        }
    }

    /// The hymn button: start, resume, or move on to another random hymn.
    pub fn primary<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PlayerCommand {
        if self.started && self.paused {
            self.paused = false;
            return PlayerCommand::Resume;
        }
        let idx = self.random_index(rng);
        self.start(idx)
    }

    pub fn toggle_pause(&mut self) -> PlayerCommand {
        if !self.started {
            return PlayerCommand::Nothing;
        }
        self.paused = !self.paused;
        if self.paused {
            PlayerCommand::Pause
        } else {
            PlayerCommand::Resume
        }
    }

    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PlayerCommand {
        let idx = if self.started {
            self.next_index()
        } else {
            self.random_index(rng)
        };
        self.start(idx)
    }

    pub fn previous<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PlayerCommand {
        let idx = if self.started {
            self.previous_index()
        } else {
            self.random_index(rng)
        };
        self.start(idx)
    }

    pub fn toggle_loop(&mut self) -> bool {
        self.looping = !self.looping;
        self.looping
    }

    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_nan() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    /// Looping repeats the current hymn; otherwise shuffle on.
    pub fn on_track_ended<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PlayerCommand {
        if self.looping && self.current.is_some() {
            return self.start(self.current);
        }
        let idx = self.random_index(rng);
        self.start(idx)
    }
}

/// Something that can play a file.
pub trait AudioBackend {
    fn start(&mut self, track: &HymnTrack, volume: f32) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn resume(&mut self, track: &HymnTrack, volume: f32) -> Result<()>;
    fn stop(&mut self);
    /// True once the current track has played to the end.
    fn finished(&mut self) -> bool;
}

/// Runs an external player per track. Pausing stops it; resuming restarts the track.
pub struct ProcessBackend {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl ProcessBackend {
    pub fn new(config: &HymnConfig) -> Self {
        Self {
            program: config.player.clone(),
            args: config.player_args.clone(),
            child: None,
        }
    }

    fn args_for(&self, track: &HymnTrack, volume: f32) -> Vec<String> {
        let percent = (volume * 100.0).round() as u32;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace("{volume}", &percent.to_string()))
            .collect();
        args.push(track.path.to_string_lossy().into_owned());
        args
    }
}

impl AudioBackend for ProcessBackend {
    fn start(&mut self, track: &HymnTrack, volume: f32) -> Result<()> {
        self.stop();
        let child = Command::new(&self.program)
            .args(self.args_for(track, volume))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("starting {}", self.program))?;
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.stop();
        Ok(())
    }

    fn resume(&mut self, track: &HymnTrack, volume: f32) -> Result<()> {
        self.start(track, volume)
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn finished(&mut self) -> bool {
        match self.child.as_mut().map(|c| c.try_wait()) {
            Some(Ok(Some(_))) => {
                self.child = None;
                true
            }
            Some(Err(e)) => {
                warn!("Lost track of hymn player: {}", e);
                self.child = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for ProcessBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Playlist plus the backend that carries out its commands.
pub struct HymnPlayer {
    tracks: Vec<HymnTrack>,
    playlist: Playlist,
    backend: Box<dyn AudioBackend + Send>,
}

impl HymnPlayer {
    pub fn new(tracks: Vec<HymnTrack>, volume: f32, backend: Box<dyn AudioBackend + Send>) -> Self {
        let playlist = Playlist::new(tracks.len(), volume);
        Self {
            tracks,
            playlist,
            backend,
        }
    }

    pub fn from_config(config: &HymnConfig) -> Self {
        let tracks = config
            .resolved_dir()
            .map(|d| discover_tracks(&d))
            .unwrap_or_default();
        Self::new(tracks, config.volume, Box::new(ProcessBackend::new(config)))
    }

    pub fn tracks(&self) -> &[HymnTrack] {
        &self.tracks
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> Option<&HymnTrack> {
        self.playlist.current().and_then(|i| self.tracks.get(i))
    }

    pub fn now_playing(&self) -> Option<String> {
        if !self.playlist.is_started() {
            return None;
        }
        self.current_track().map(|t| format!("Now playing: {}", t.title))
    }

    fn apply(&mut self, command: PlayerCommand) -> Result<()> {
        let volume = self.playlist.volume();
        match command {
            PlayerCommand::Start(i) => match self.tracks.get(i) {
                Some(track) => self.backend.start(track, volume),
                None => Ok(()),
            },
            PlayerCommand::Pause => self.backend.pause(),
            PlayerCommand::Resume => match self.current_track() {
                Some(track) => {
                    let track = track.clone();
                    self.backend.resume(&track, volume)
                }
                None => Ok(()),
            },
            PlayerCommand::Nothing => Ok(()),
        }
    }

    pub fn primary(&mut self) -> Result<()> {
        let cmd = self.playlist.primary(&mut rand::rng());
        self.apply(cmd)
    }

    pub fn toggle_pause(&mut self) -> Result<()> {
        let cmd = self.playlist.toggle_pause();
        self.apply(cmd)
    }

    pub fn next(&mut self) -> Result<()> {
        let cmd = self.playlist.next(&mut rand::rng());
        self.apply(cmd)
    }

    pub fn previous(&mut self) -> Result<()> {
        let cmd = self.playlist.previous(&mut rand::rng());
        self.apply(cmd)
    }

    pub fn toggle_loop(&mut self) -> bool {
        self.playlist.toggle_loop()
    }

    /// Takes effect from the next track the player starts.
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.playlist.set_volume(self.playlist.volume() + delta);
        self.playlist.volume()
    }

    /// Called periodically; advances the playlist when a track has finished.
    pub fn tick(&mut self) -> Result<()> {
        if self.playlist.is_started() && !self.playlist.is_paused() && self.backend.finished() {
            let cmd = self.playlist.on_track_ended(&mut rand::rng());
            self.apply(cmd)?;
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        self.backend.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::{Arc, Mutex};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn random_never_repeats_current_when_there_is_a_choice() {
        let mut p = Playlist::new(2, 0.2);
        let mut r = rng();
        for _ in 0..50 {
            let before = p.current();
            let cmd = p.primary(&mut r);
            if let PlayerCommand::Start(i) = cmd {
                assert_ne!(Some(i), before);
            } else {
                panic!("expected a start, got {:?}", cmd);
            }
        }
    }

    #[test]
    fn single_track_may_repeat() {
        let mut p = Playlist::new(1, 0.2);
        assert_eq!(p.primary(&mut rng()), PlayerCommand::Start(0));
        assert_eq!(p.primary(&mut rng()), PlayerCommand::Start(0));
    }

    #[test]
    fn empty_playlist_does_nothing() {
        let mut p = Playlist::new(0, 0.2);
        assert_eq!(p.primary(&mut rng()), PlayerCommand::Nothing);
        assert_eq!(p.next(&mut rng()), PlayerCommand::Nothing);
        assert_eq!(p.toggle_pause(), PlayerCommand::Nothing);
        assert!(!p.is_started());
    }

    #[test]
    fn sequential_navigation_wraps() {
        let mut p = Playlist::new(3, 0.2);
        assert_eq!(p.next_index(), Some(0));
        assert_eq!(p.previous_index(), Some(0));
        p.primary(&mut rng());
        p.current = Some(2);
        assert_eq!(p.next(&mut rng()), PlayerCommand::Start(0));
        assert_eq!(p.previous(&mut rng()), PlayerCommand::Start(2));
    }

    #[test]
    fn pause_then_primary_resumes() {
        let mut p = Playlist::new(3, 0.2);
        p.primary(&mut rng());
        assert_eq!(p.toggle_pause(), PlayerCommand::Pause);
        assert!(p.is_paused());
        assert_eq!(p.primary(&mut rng()), PlayerCommand::Resume);
        assert!(!p.is_paused());
    }

    #[test]
    fn loop_repeats_current_track() {
        let mut p = Playlist::new(4, 0.2);
        let first = match p.primary(&mut rng()) {
            PlayerCommand::Start(i) => i,
            other => panic!("unexpected {:?}", other),
        };
        assert!(p.toggle_loop());
        assert_eq!(p.on_track_ended(&mut rng()), PlayerCommand::Start(first));
        p.toggle_loop();
        assert_ne!(p.on_track_ended(&mut rng()), PlayerCommand::Start(first));
    }

    #[test]
    fn volume_is_clamped() {
        let mut p = Playlist::new(1, 3.0);
        assert_eq!(p.volume(), 1.0);
        p.set_volume(-0.5);
        assert_eq!(p.volume(), 0.0);
        p.set_volume(f32::NAN);
        assert_eq!(p.volume(), 0.0);
    }

    #[derive(Default)]
    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
        done: Arc<Mutex<bool>>,
    }

    impl AudioBackend for Recorder {
        fn start(&mut self, track: &HymnTrack, volume: f32) -> Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("start {} {:.1}", track.title, volume));
            Ok(())
        }
        fn pause(&mut self) -> Result<()> {
            self.log.lock().unwrap().push("pause".into());
            Ok(())
        }
        fn resume(&mut self, track: &HymnTrack, _: f32) -> Result<()> {
            self.log.lock().unwrap().push(format!("resume {}", track.title));
            Ok(())
        }
        fn stop(&mut self) {}
        fn finished(&mut self) -> bool {
            std::mem::take(&mut *self.done.lock().unwrap())
        }
    }

    fn track(title: &str) -> HymnTrack {
        HymnTrack {
            title: title.to_string(),
            path: PathBuf::from(format!("{}.mp3", title)),
        }
    }

    #[test]
    fn player_drives_backend_and_follows_track_end() {
        let recorder = Recorder::default();
        let log = recorder.log.clone();
        let done = recorder.done.clone();
        let mut player = HymnPlayer::new(vec![track("Belisarius")], 0.2, Box::new(recorder));

        assert_eq!(player.now_playing(), None);
        player.primary().unwrap();
        assert_eq!(player.now_playing().as_deref(), Some("Now playing: Belisarius"));
        player.toggle_pause().unwrap();
        player.tick().unwrap();
        player.toggle_pause().unwrap();
        *done.lock().unwrap() = true;
        player.tick().unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "start Belisarius 0.2",
                "pause",
                "resume Belisarius",
                "start Belisarius 0.2",
            ]
        );
    }

    #[test]
    fn discovery_keeps_audio_files_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["We Praise Thee.mp3", "Hymn of the Cherubim.OGG", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let titles: Vec<String> = discover_tracks(dir.path())
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Hymn of the Cherubim", "We Praise Thee"]);
        assert!(discover_tracks(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn player_arguments_carry_volume_and_path() {
        let backend = ProcessBackend::new(&HymnConfig::default());
        let args = backend.args_for(&track("Belisarius"), 0.25);
        assert_eq!(
            args,
            vec!["--no-video", "--really-quiet", "--volume=25", "Belisarius.mp3"]
        );
    }
}
