// Night-sky countdown page
// Starfield background, firework show, countdown, timeline and music toggle

pub mod config;
pub mod constants;
pub mod countdown;
pub mod error;
pub mod fireworks;
pub mod music;
pub mod page;
pub mod particles;
pub mod scroll;
pub mod starfield;
pub mod surface;
pub mod timeline;
pub mod triggers;

use bevy::prelude::*;

pub use config::PageConfig;
pub use error::PageError;

/// Everything on the page. Expects `DefaultPlugins` to be added first.
pub struct PagePlugin;

impl Plugin for PagePlugin {
    fn build(&self, app: &mut App) {
        // Plugins below read the config while building their resources
        let existing = app.world().get_resource::<PageConfig>().map(PageConfig::validate);
        match existing {
            None => {
                app.insert_resource(PageConfig::load());
            }
            Some(Err(e)) => {
                warn!("{} - using default page config", e);
                app.insert_resource(PageConfig::default());
            }
            Some(Ok(())) => {}
        }

        app.add_plugins((
            surface::SurfacePlugin,
            triggers::TriggerPlugin,
            page::PageLayoutPlugin,
            starfield::StarfieldPlugin,
            fireworks::FireworksPlugin,
            countdown::CountdownPlugin,
            scroll::ScrollPlugin,
            timeline::TimelinePlugin,
            music::MusicPlugin,
        ));
    }
}
