// Background music toggle
// The track is spawned paused and looping; the music button flips it

use bevy::audio::{AudioSink, AudioSinkPlayback, PlaybackSettings};
use bevy::prelude::*;

use crate::config::PageConfig;
use crate::constants::*;
use crate::error::PageError;

/// Something that can start and pause the background track
pub trait Playback {
    fn play(&mut self) -> Result<(), PageError>;
    fn pause(&mut self);
}

/// Play/pause state as the user sees it
#[derive(Resource, Debug, Default)]
pub struct MusicController {
    playing: bool,
}

impl MusicController {
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Flip playback. A failed play leaves the state untouched.
    /// Returns the new playing state.
    pub fn toggle<P: Playback + ?Sized>(&mut self, playback: &mut P) -> Result<bool, PageError> {
        if self.playing {
            playback.pause();
            self.playing = false;
        } else {
            playback.play()?;
            self.playing = true;
        }
        Ok(self.playing)
    }

    pub fn button_label(&self) -> &'static str {
        if self.playing {
            "Pause music"
        } else {
            "Play music"
        }
    }
}

/// Bevy audio sink; absent until the track has loaded
struct SinkPlayback<'a> {
    sink: Option<&'a AudioSink>,
}

impl Playback for SinkPlayback<'_> {
    fn play(&mut self) -> Result<(), PageError> {
        match self.sink {
            Some(sink) => {
                sink.play();
                Ok(())
            }
            None => Err(PageError::Playback("track is not loaded".to_string())),
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink {
            sink.pause();
        }
    }
}

/// Marker for the background track entity
#[derive(Component)]
pub struct BackgroundMusic;

#[derive(Component)]
pub struct MusicButton;

#[derive(Component)]
pub struct MusicButtonLabel;

pub const MUSIC_BUTTON_COLOR: Color = Color::srgba(1.0, 0.6, 0.65, 0.85);

pub struct MusicPlugin;

impl Plugin for MusicPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MusicController>()
            .add_systems(Startup, spawn_background_music)
            .add_systems(Update, (handle_music_button, pulse_music_button).chain());
    }
}

fn spawn_background_music(
    mut commands: Commands,
    config: Res<PageConfig>,
    asset_server: Res<AssetServer>,
) {
    let track: Handle<AudioSource> = asset_server.load(config.assets.music.clone());
    commands.spawn((
        AudioPlayer::new(track),
        PlaybackSettings {
            paused: true,
            ..PlaybackSettings::LOOP
        },
        BackgroundMusic,
        Name::new("BackgroundMusic"),
    ));
    debug!("Background music queued: {}", config.assets.music);
}

fn handle_music_button(
    interactions: Query<&Interaction, (Changed<Interaction>, With<MusicButton>)>,
    mut controller: ResMut<MusicController>,
    sinks: Query<&AudioSink, With<BackgroundMusic>>,
    mut labels: Query<&mut Text, With<MusicButtonLabel>>,
) {
    for interaction in interactions.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }

        let mut playback = SinkPlayback {
            sink: sinks.single().ok(),
        };
        match controller.toggle(&mut playback) {
            Ok(true) => info!("🎵 Music playing"),
            Ok(false) => info!("🎵 Music paused"),
            Err(e) => warn!("🎵 {}", e),
        }

        for mut text in labels.iter_mut() {
            **text = controller.button_label().to_string();
        }
    }
}

/// While paused the button breathes to invite a click
fn pulse_music_button(
    time: Res<Time>,
    controller: Res<MusicController>,
    mut buttons: Query<&mut BackgroundColor, With<MusicButton>>,
) {
    let alpha = if controller.is_playing() {
        MUSIC_BUTTON_COLOR.alpha()
    } else {
        let phase = time.elapsed_secs() / MUSIC_PULSE_PERIOD_SECS * std::f32::consts::TAU;
        MUSIC_BUTTON_COLOR.alpha() * (0.7 + 0.3 * phase.sin())
    };

    for mut background in buttons.iter_mut() {
        background.0 = MUSIC_BUTTON_COLOR.with_alpha(alpha);
    }
}
