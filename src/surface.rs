// Drawing surfaces for the starfield and firework layers
// Simulation runs in surface pixels (origin top-left, y down); this module maps
// those onto Bevy's 2D world (origin at window center, y up)

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::{PrimaryWindow, WindowResized};

use crate::constants::*;

/// Rectangle of the window a layer draws into, in logical window pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    /// Distance from the top of the window to the top of the surface
    pub top: f32,
    pub size: Vec2,
}

impl Surface {
    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Convert a surface-local point to a world position for a window of `window` size
    pub fn to_world(&self, point: Vec2, window: Vec2) -> Vec2 {
        Vec2::new(
            point.x - window.x / 2.0,
            window.y / 2.0 - (self.top + point.y),
        )
    }
}

/// Current logical window size, kept in sync with resize events
#[derive(Resource, Clone, Copy, Debug)]
pub struct Viewport {
    pub size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size: Vec2::new(1280.0, 720.0),
        }
    }
}

impl Viewport {
    /// Full-window surface used by the starfield
    pub fn starfield_surface(&self) -> Surface {
        Surface {
            top: 0.0,
            size: self.size,
        }
    }

    /// Bottom strip of the window used by fireworks
    pub fn fireworks_surface(&self) -> Surface {
        let height = self.size.y * FIREWORK_SURFACE_FRACTION;
        Surface {
            top: self.size.y - height,
            size: Vec2::new(self.size.x, height),
        }
    }
}

/// Shared soft-edged circle texture used by every star and particle sprite
#[derive(Resource, Clone)]
pub struct CircleTexture(pub Handle<Image>);

pub struct SurfacePlugin;

impl Plugin for SurfacePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Viewport>()
            .add_systems(PreStartup, (read_initial_viewport, create_circle_texture))
            .add_systems(PreUpdate, track_window_resize);
    }
}

fn read_initial_viewport(
    mut viewport: ResMut<Viewport>,
    window_query: Query<&Window, With<PrimaryWindow>>,
) {
    if let Ok(window) = window_query.single() {
        viewport.size = Vec2::new(window.width(), window.height());
        info!("Viewport {}x{}", viewport.size.x, viewport.size.y);
    }
}

fn track_window_resize(
    mut resize_events: EventReader<WindowResized>,
    mut viewport: ResMut<Viewport>,
) {
    // Only the most recent size matters
    if let Some(event) = resize_events.read().last() {
        viewport.size = Vec2::new(event.width, event.height);
        debug!("Viewport resized to {}x{}", event.width, event.height);
    }
}

fn create_circle_texture(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let data = circle_texture_data(CIRCLE_TEXTURE_SIZE);
    let image = Image::new(
        Extent3d {
            width: CIRCLE_TEXTURE_SIZE,
            height: CIRCLE_TEXTURE_SIZE,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    );
    commands.insert_resource(CircleTexture(images.add(image)));
}

/// White disc with a one-pixel antialiased rim; tinting is done by the sprite color
fn circle_texture_data(size: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    let center = size as f32 / 2.0;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let dist = (dx * dx + dy * dy).sqrt();
            let alpha = (center - dist).clamp(0.0, 1.0) * 255.0;
            data.extend_from_slice(&[255, 255, 255, alpha as u8]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fireworks_surface_is_bottom_strip() {
        let viewport = Viewport {
            size: Vec2::new(1000.0, 800.0),
        };
        let surface = viewport.fireworks_surface();
        assert_eq!(surface.width(), 1000.0);
        assert!((surface.height() - 240.0).abs() < 1e-3);
        assert!((surface.top - 560.0).abs() < 1e-3);
    }

    #[test]
    fn test_to_world_maps_corners() {
        let window = Vec2::new(1000.0, 800.0);
        let viewport = Viewport { size: window };

        let stars = viewport.starfield_surface();
        assert_eq!(stars.to_world(Vec2::ZERO, window), Vec2::new(-500.0, 400.0));
        assert_eq!(stars.to_world(window, window), Vec2::new(500.0, -400.0));

        let fireworks = viewport.fireworks_surface();
        let bottom_left = fireworks.to_world(Vec2::new(0.0, fireworks.height()), window);
        assert!((bottom_left.y + 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_circle_texture_is_opaque_in_center_and_clear_in_corner() {
        let size = 16;
        let data = circle_texture_data(size);
        assert_eq!(data.len(), (size * size * 4) as usize);

        let alpha_at = |x: u32, y: u32| data[((y * size + x) * 4 + 3) as usize];
        assert_eq!(alpha_at(8, 8), 255);
        assert_eq!(alpha_at(0, 0), 0);
    }
}
