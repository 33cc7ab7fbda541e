// Starfield background: a fixed population of gold dots drifting down the window

use bevy::prelude::*;
use rand::Rng;

use crate::config::PageConfig;
use crate::constants::*;
use crate::surface::{CircleTexture, Viewport};

#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub position: Vec2,
    pub radius: f32,
    /// Pixels per frame
    pub speed: f32,
    pub opacity: f32,
}

#[derive(Resource, Default, Debug)]
pub struct Starfield {
    stars: Vec<Star>,
    size: Vec2,
}

impl Starfield {
    pub fn new<R: Rng + ?Sized>(count: usize, size: Vec2, rng: &mut R) -> Self {
        let stars = (0..count)
            .map(|_| Star {
                position: Vec2::new(rng.gen::<f32>() * size.x, rng.gen::<f32>() * size.y),
                radius: rng.gen::<f32>() * STAR_RADIUS_RANGE + STAR_RADIUS_MIN,
                speed: rng.gen::<f32>() * STAR_SPEED_RANGE + STAR_SPEED_MIN,
                opacity: rng.gen::<f32>() * STAR_OPACITY_RANGE + STAR_OPACITY_MIN,
            })
            .collect();

        Self { stars, size }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Stars keep their positions; the next step wraps any that are now out of range
    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Move every star down by its speed, re-entering from the top once it
    /// reaches the bottom edge
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (width, height) = (self.size.x, self.size.y);

        for star in &mut self.stars {
            star.position.y += star.speed;

            if star.position.y >= height {
                star.position.y = -star.radius;
                star.position.x = rng.gen::<f32>() * width;
            }
        }
    }
}

/// Sprite bound to the star at this index
#[derive(Component)]
pub struct StarSprite(pub usize);

pub struct StarfieldPlugin;

impl Plugin for StarfieldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Starfield>()
            .add_systems(Startup, spawn_starfield)
            .add_systems(Update, (resize_starfield, step_starfield, sync_star_sprites).chain());
    }
}

fn spawn_starfield(
    mut commands: Commands,
    config: Res<PageConfig>,
    viewport: Res<Viewport>,
    circle: Res<CircleTexture>,
) {
    let mut rng = rand::thread_rng();
    let starfield = Starfield::new(config.starfield.star_count, viewport.size, &mut rng);
    let surface = viewport.starfield_surface();
    let [r, g, b] = STAR_COLOR;

    commands
        .spawn((
            Transform::from_xyz(0.0, 0.0, STARFIELD_Z),
            Visibility::Visible,
            Name::new("Starfield"),
        ))
        .with_children(|parent| {
            for (index, star) in starfield.stars().iter().enumerate() {
                let world = surface.to_world(star.position, viewport.size);
                parent.spawn((
                    StarSprite(index),
                    Sprite {
                        image: circle.0.clone(),
                        color: Color::srgb_u8(r, g, b).with_alpha(star.opacity),
                        custom_size: Some(Vec2::splat(star.radius * 2.0)),
                        ..default()
                    },
                    Transform::from_translation(world.extend(0.0)),
                ));
            }
        });

    info!("✨ Spawned starfield with {} stars", starfield.stars().len());
    commands.insert_resource(starfield);
}

fn resize_starfield(viewport: Res<Viewport>, mut starfield: ResMut<Starfield>) {
    if viewport.is_changed() && starfield.size() != viewport.size {
        starfield.resize(viewport.size);
    }
}

fn step_starfield(mut starfield: ResMut<Starfield>) {
    let mut rng = rand::thread_rng();
    starfield.step(&mut rng);
}

fn sync_star_sprites(
    starfield: Res<Starfield>,
    viewport: Res<Viewport>,
    mut sprites: Query<(&StarSprite, &mut Transform)>,
) {
    let surface = viewport.starfield_surface();
    let stars = starfield.stars();

    for (slot, mut transform) in sprites.iter_mut() {
        if let Some(star) = stars.get(slot.0) {
            let world = surface.to_world(star.position, viewport.size);
            transform.translation = world.extend(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initial_population() {
        let mut rng = StdRng::seed_from_u64(1);
        let size = Vec2::new(800.0, 600.0);
        let field = Starfield::new(200, size, &mut rng);

        assert_eq!(field.stars().len(), 200);
        for star in field.stars() {
            assert!(star.position.x >= 0.0 && star.position.x < size.x);
            assert!(star.position.y >= 0.0 && star.position.y < size.y);
            assert!(star.radius >= 1.0 && star.radius < 3.0);
            assert!(star.speed >= 0.1 && star.speed < 0.6);
            assert!(star.opacity >= 0.2 && star.opacity < 1.0);
        }
    }

    #[test]
    fn test_stars_stay_in_wrap_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let size = Vec2::new(300.0, 40.0);
        let mut field = Starfield::new(200, size, &mut rng);

        // Enough frames for every star to wrap at least once
        for _ in 0..1000 {
            field.step(&mut rng);
            for star in field.stars() {
                assert!(star.position.y >= -star.radius);
                assert!(star.position.y < size.y);
            }
        }
        assert_eq!(field.stars().len(), 200);
    }

    #[test]
    fn test_wrapped_star_reenters_above_top() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = Starfield {
            stars: vec![Star {
                position: Vec2::new(10.0, 99.8),
                radius: 2.5,
                speed: 0.5,
                opacity: 1.0,
            }],
            size: Vec2::new(200.0, 100.0),
        };

        field.step(&mut rng);

        let star = &field.stars()[0];
        assert_eq!(star.position.y, -2.5);
        assert!(star.position.x >= 0.0 && star.position.x < 200.0);
    }

    #[test]
    fn test_shrinking_window_wraps_on_next_step() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut field = Starfield::new(50, Vec2::new(400.0, 400.0), &mut rng);

        field.resize(Vec2::new(400.0, 100.0));
        field.step(&mut rng);

        for star in field.stars() {
            assert!(star.position.y < 100.0);
        }
    }
}
