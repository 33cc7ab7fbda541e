// Firework show: session state machine, burst scheduling and the particle layer
//
// Idle -> Active on StartFireworks. After `show_secs` the show stops emitting
// (Draining) and the frame loop keeps stepping until every particle is gone.
// Independently, `cleanup_secs` after the stop the collection is cleared and
// the layer hidden, whether or not particles are still alive.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::config::{FireworksConfig, PageConfig};
use crate::constants::*;
use crate::particles::{Particle, ParticleSystem};
use crate::surface::{CircleTexture, Surface, Viewport};
use crate::triggers::{StartFireworks, StopFireworks};

/// Observable phase of the show
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ShowPhase {
    #[default]
    Idle,
    /// Bursts are being scheduled
    Active,
    /// No new bursts, particles still fading out
    Draining,
}

/// What happened during one `FireworkShow::tick`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShowTick {
    /// Bursts due this frame
    pub bursts: u32,
    /// The show timer ran out this frame
    pub stopped: bool,
    /// The cleanup deadline passed: clear particles, hide the layer
    pub cleanup: bool,
}

/// The one firework session owned by the app.
///
/// A new start replaces every timer of the previous session, so overlapping
/// triggers extend the show instead of stacking burst schedules.
#[derive(Resource, Debug)]
pub struct FireworkShow {
    active: bool,
    /// Bumped on every start
    session: u64,
    burst_timer: Timer,
    stop_timer: Timer,
    /// Pending hard deadline after a stop
    cleanup_timer: Option<Timer>,
    cleanup_secs: f32,
    surface_visible: bool,
}

impl FireworkShow {
    pub fn new(config: &FireworksConfig) -> Self {
        Self {
            active: false,
            session: 0,
            burst_timer: Timer::from_seconds(config.burst_interval_secs, TimerMode::Repeating),
            stop_timer: Timer::from_seconds(config.show_secs, TimerMode::Once),
            cleanup_timer: None,
            cleanup_secs: config.cleanup_secs,
            surface_visible: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn surface_visible(&self) -> bool {
        self.surface_visible
    }

    pub fn cleanup_pending(&self) -> bool {
        self.cleanup_timer.is_some()
    }

    pub fn phase(&self, particles: &ParticleSystem) -> ShowPhase {
        if self.active {
            ShowPhase::Active
        } else if !particles.is_empty() {
            ShowPhase::Draining
        } else {
            ShowPhase::Idle
        }
    }

    /// Whether the frame loop should step particles this frame
    pub fn is_animating(&self, particles: &ParticleSystem) -> bool {
        self.active || !particles.is_empty()
    }

    /// Begin a new session, cancelling whatever the previous one had scheduled.
    /// Returns the new session number.
    pub fn start(&mut self) -> u64 {
        self.session += 1;
        self.active = true;
        self.surface_visible = true;
        self.burst_timer.reset();
        self.stop_timer.reset();
        self.cleanup_timer = None;
        self.session
    }

    /// Stop emitting and arm the cleanup deadline. No-op unless active.
    pub fn stop(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.cleanup_timer = Some(Timer::from_seconds(self.cleanup_secs, TimerMode::Once));
        true
    }

    pub fn tick(&mut self, delta: Duration) -> ShowTick {
        let mut tick = ShowTick::default();

        if self.active {
            self.burst_timer.tick(delta);
            tick.bursts = self.burst_timer.times_finished_this_tick();

            self.stop_timer.tick(delta);
            if self.stop_timer.just_finished() {
                tick.stopped = self.stop();
            }
        } else if let Some(timer) = self.cleanup_timer.as_mut() {
            timer.tick(delta);
            if timer.finished() {
                self.cleanup_timer = None;
                self.surface_visible = false;
                tick.cleanup = true;
            }
        }

        tick
    }
}

impl FromWorld for FireworkShow {
    fn from_world(world: &mut World) -> Self {
        let config = world
            .get_resource::<PageConfig>()
            .map(|c| c.fireworks.clone())
            .unwrap_or_default();
        Self::new(&config)
    }
}

/// Random burst position inside the upper half of the firework surface
pub fn burst_origin<R: Rng + ?Sized>(surface: Surface, rng: &mut R) -> Vec2 {
    let height = surface.height();
    Vec2::new(
        rng.gen::<f32>() * surface.width(),
        rng.gen::<f32>() * height * BURST_Y_RANGE_FRACTION + height * BURST_Y_MIN_FRACTION,
    )
}

/// One frame of the show: timers, bursts, cleanup, then the particle step
pub fn advance_show<R: Rng + ?Sized>(
    show: &mut FireworkShow,
    particles: &mut ParticleSystem,
    surface: Surface,
    delta: Duration,
    rng: &mut R,
) -> ShowTick {
    let tick = show.tick(delta);

    for _ in 0..tick.bursts {
        let origin = burst_origin(surface, rng);
        particles.emit_burst(origin, rng);
    }

    if tick.cleanup {
        particles.clear();
    }

    if show.is_animating(particles) {
        particles.step();
    }

    tick
}

// ============================================================================
// RENDERING
// ============================================================================

/// Parent of every particle sprite; its visibility is the "surface shown" flag
#[derive(Component)]
pub struct FireworksLayer;

/// Sprite slot bound to the particle at this index
#[derive(Component)]
pub struct ParticleSprite(pub usize);

/// Number of particle sprite slots spawned so far (slots are reused, never despawned)
#[derive(Resource, Default)]
pub struct ParticleSpritePool {
    pub spawned: usize,
}

pub struct FireworksPlugin;

impl Plugin for FireworksPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ParticleSystem>()
            .init_resource::<FireworkShow>()
            .init_resource::<ParticleSpritePool>()
            .add_systems(Startup, spawn_fireworks_layer)
            .add_systems(
                Update,
                (
                    handle_show_requests,
                    run_firework_show,
                    sync_fireworks_layer,
                    sync_particle_sprites,
                )
                    .chain(),
            );
    }
}

fn spawn_fireworks_layer(mut commands: Commands) {
    commands.spawn((
        FireworksLayer,
        Transform::from_xyz(0.0, 0.0, FIREWORKS_Z),
        Visibility::Hidden,
        Name::new("FireworksLayer"),
    ));
}

fn handle_show_requests(
    mut start_events: EventReader<StartFireworks>,
    mut stop_events: EventReader<StopFireworks>,
    mut show: ResMut<FireworkShow>,
) {
    for event in start_events.read() {
        let was_active = show.is_active();
        let session = show.start();
        if was_active {
            info!("🎆 Fireworks restarted by {:?} (session {})", event.source, session);
        } else {
            info!("🎆 Fireworks started by {:?} (session {})", event.source, session);
        }
    }

    for _ in stop_events.read() {
        if show.stop() {
            info!("🎆 Fireworks stopped (session {}), draining", show.session());
        }
    }
}

fn run_firework_show(
    time: Res<Time>,
    viewport: Res<Viewport>,
    mut show: ResMut<FireworkShow>,
    mut particles: ResMut<ParticleSystem>,
) {
    if !show.is_active() && !show.cleanup_pending() && particles.is_empty() {
        return;
    }

    let before = show.phase(&particles);
    let mut rng = rand::thread_rng();
    let surface = viewport.fireworks_surface();
    let tick = advance_show(&mut show, &mut particles, surface, time.delta(), &mut rng);

    let after = show.phase(&particles);
    if after != before {
        debug!("🎆 Session {}: {:?} -> {:?}", show.session(), before, after);
    }

    if tick.bursts > 0 {
        debug!("💥 {} burst(s), {} particles live", tick.bursts, particles.len());
    }
    if tick.stopped {
        info!(
            "🎆 Session {} timer elapsed, draining {} particles",
            show.session(),
            particles.len()
        );
    }
    if tick.cleanup {
        info!("🎆 Cleanup deadline reached, fireworks layer hidden");
    }
}

fn sync_fireworks_layer(
    show: Res<FireworkShow>,
    mut layer_query: Query<&mut Visibility, With<FireworksLayer>>,
) {
    let target = if show.surface_visible() {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    for mut visibility in layer_query.iter_mut() {
        visibility.set_if_neq(target);
    }
}

fn sync_particle_sprites(
    mut commands: Commands,
    particles: Res<ParticleSystem>,
    viewport: Res<Viewport>,
    circle: Option<Res<CircleTexture>>,
    mut pool: ResMut<ParticleSpritePool>,
    layer_query: Query<Entity, With<FireworksLayer>>,
    mut sprites: Query<(&ParticleSprite, &mut Sprite, &mut Transform, &mut Visibility)>,
) {
    let surface = viewport.fireworks_surface();
    let live = particles.particles();

    for (slot, mut sprite, mut transform, mut visibility) in sprites.iter_mut() {
        match live.get(slot.0) {
            Some(particle) => {
                apply_particle(particle, surface, viewport.size, &mut sprite, &mut transform);
                visibility.set_if_neq(Visibility::Inherited);
            }
            None => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }

    if live.len() <= pool.spawned {
        return;
    }
    let (Ok(layer), Some(circle)) = (layer_query.single(), circle) else {
        return;
    };

    let first_new = pool.spawned;
    commands.entity(layer).with_children(|parent| {
        for (index, particle) in live.iter().enumerate().skip(first_new) {
            let mut sprite = Sprite::from_image(circle.0.clone());
            let mut transform = Transform::default();
            apply_particle(particle, surface, viewport.size, &mut sprite, &mut transform);
            parent.spawn((ParticleSprite(index), sprite, transform, Visibility::Inherited));
        }
    });
    debug!("Particle sprite pool grew {} -> {}", first_new, live.len());
    pool.spawned = live.len();
}

fn apply_particle(
    particle: &Particle,
    surface: Surface,
    window: Vec2,
    sprite: &mut Sprite,
    transform: &mut Transform,
) {
    let world = surface.to_world(particle.position, window);
    transform.translation = world.extend(0.0);
    sprite.custom_size = Some(Vec2::splat(particle.radius * 2.0));
    sprite.color = particle.color.with_alpha(particle.life.clamp(0.0, 1.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: Duration = Duration::from_millis(10);

    fn show() -> FireworkShow {
        FireworkShow::new(&FireworksConfig::default())
    }

    fn surface() -> Surface {
        Surface {
            top: 560.0,
            size: Vec2::new(1000.0, 240.0),
        }
    }

    fn run_frames(
        show: &mut FireworkShow,
        particles: &mut ParticleSystem,
        rng: &mut StdRng,
        frames: usize,
    ) {
        for _ in 0..frames {
            advance_show(show, particles, surface(), FRAME, rng);
        }
    }

    #[test]
    fn test_new_show_is_idle() {
        let show = show();
        let particles = ParticleSystem::default();
        assert_eq!(show.phase(&particles), ShowPhase::Idle);
        assert!(!show.surface_visible());
        assert!(!show.is_animating(&particles));
    }

    #[test]
    fn test_full_show_timeline() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut show = show();
        let mut particles = ParticleSystem::default();

        show.start();
        assert_eq!(show.phase(&particles), ShowPhase::Active);
        assert!(show.surface_visible());

        // Just before the 3 s mark the show is still running
        run_frames(&mut show, &mut particles, &mut rng, 299);
        assert!(show.is_active());

        // At 3 s the flag clears but particles remain
        run_frames(&mut show, &mut particles, &mut rng, 1);
        assert!(!show.is_active());
        assert!(show.cleanup_pending());
        assert_eq!(show.phase(&particles), ShowPhase::Draining);
        assert!(show.surface_visible());

        // At 5 s the collection is empty and the layer hidden
        run_frames(&mut show, &mut particles, &mut rng, 200);
        assert!(particles.is_empty());
        assert!(!show.surface_visible());
        assert!(!show.cleanup_pending());
        assert_eq!(show.phase(&particles), ShowPhase::Idle);
    }

    #[test]
    fn test_bursts_every_interval_while_active() {
        let mut show = show();
        show.start();

        let mut bursts = 0;
        for _ in 0..300 {
            bursts += show.tick(FRAME).bursts;
        }
        // 0.5, 1.0, ... 3.0
        assert_eq!(bursts, 6);

        for _ in 0..100 {
            assert_eq!(show.tick(FRAME).bursts, 0);
        }
    }

    #[test]
    fn test_cleanup_clears_live_particles() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut show = show();
        let mut particles = ParticleSystem::default();

        show.start();
        run_frames(&mut show, &mut particles, &mut rng, 300);
        assert!(!show.is_active());

        // A late burst is still alive when the deadline hits
        run_frames(&mut show, &mut particles, &mut rng, 180);
        particles.emit_burst(Vec2::new(10.0, 10.0), &mut rng);
        run_frames(&mut show, &mut particles, &mut rng, 19);
        assert!(show.cleanup_pending());
        assert!(!particles.is_empty());

        let tick = advance_show(&mut show, &mut particles, surface(), FRAME, &mut rng);
        assert!(tick.cleanup);
        assert!(particles.is_empty());
    }

    #[test]
    fn test_restart_while_active_keeps_flag_set() {
        let mut show = show();
        let first = show.start();
        for _ in 0..150 {
            show.tick(FRAME);
        }

        let second = show.start();
        assert!(second > first);
        assert!(show.is_active());

        // The old session's stop time passes without stopping the new one
        for _ in 0..200 {
            show.tick(FRAME);
        }
        assert!(show.is_active());
    }

    #[test]
    fn test_restart_during_drain_cancels_cleanup() {
        let mut show = show();
        show.start();
        for _ in 0..300 {
            show.tick(FRAME);
        }
        assert!(show.cleanup_pending());

        show.start();
        assert!(!show.cleanup_pending());
        for _ in 0..250 {
            let tick = show.tick(FRAME);
            assert!(!tick.cleanup);
        }
        assert!(show.surface_visible());
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut show = show();
        assert!(!show.stop());
        assert!(!show.cleanup_pending());
    }

    #[test]
    fn test_frame_loop_stops_once_drained() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut show = show();
        let mut particles = ParticleSystem::default();

        particles.emit_burst(Vec2::new(100.0, 100.0), &mut rng);
        assert!(show.is_animating(&particles));

        for _ in 0..200 {
            advance_show(&mut show, &mut particles, surface(), FRAME, &mut rng);
        }
        assert!(particles.is_empty());
        assert!(!show.is_animating(&particles));
    }

    fn fireworks_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<StartFireworks>()
            .add_event::<StopFireworks>()
            .init_resource::<Viewport>()
            .insert_resource(CircleTexture(Handle::default()))
            .add_plugins(FireworksPlugin);
        app
    }

    #[test]
    fn test_dead_particles_hidden_on_next_render() {
        let mut app = fireworks_app();
        app.update();

        let mut rng = StdRng::seed_from_u64(3);
        let emitted = app
            .world_mut()
            .resource_mut::<ParticleSystem>()
            .emit_burst(Vec2::new(200.0, 50.0), &mut rng);

        // The first render grows the pool to one slot per particle
        app.update();
        assert_eq!(app.world().resource::<ParticleSpritePool>().spawned, emitted);

        let mut sprites = app.world_mut().query::<(&ParticleSprite, &Visibility)>();
        for _ in 0..200 {
            app.update();

            let live = app.world().resource::<ParticleSystem>().len();
            for (slot, visibility) in sprites.iter(app.world()) {
                if slot.0 < live {
                    assert_eq!(*visibility, Visibility::Inherited);
                } else {
                    assert_eq!(*visibility, Visibility::Hidden, "slot {} of {}", slot.0, live);
                }
            }
            if live == 0 {
                break;
            }
        }

        assert!(app.world().resource::<ParticleSystem>().is_empty());
        assert_eq!(sprites.iter(app.world()).count(), emitted);
    }

    #[test]
    fn test_start_event_shows_layer() {
        let mut app = fireworks_app();
        app.update();

        app.world_mut().send_event(StartFireworks {
            source: crate::triggers::TriggerSource::Manual,
        });
        app.update();

        let show = app.world().resource::<FireworkShow>();
        assert!(show.is_active());
        assert_eq!(show.session(), 1);

        let mut layers = app
            .world_mut()
            .query_filtered::<&Visibility, With<FireworksLayer>>();
        let visible: Vec<Visibility> = layers.iter(app.world()).copied().collect();
        assert_eq!(visible, vec![Visibility::Visible]);
    }

    #[test]
    fn test_burst_origin_inside_upper_band() {
        let mut rng = StdRng::seed_from_u64(8);
        let surface = surface();
        for _ in 0..200 {
            let origin = burst_origin(surface, &mut rng);
            assert!(origin.x >= 0.0 && origin.x < surface.width());
            assert!(origin.y >= surface.height() * 0.1);
            assert!(origin.y < surface.height() * 0.6);
        }
    }
}
