// Tunable constants for the night-sky page
// Values that are not exposed through page.toml live here

// ============================================================================
// FIREWORK PARTICLES
// ============================================================================

/// Smallest burst size (inclusive)
pub const BURST_SIZE_MIN: usize = 20;
/// Largest burst size (inclusive)
pub const BURST_SIZE_MAX: usize = 35;

/// Full width of the uniform velocity distribution, centered on zero
pub const PARTICLE_VELOCITY_SPREAD: f32 = 6.0;
/// Subtracted from vy so bursts drift upward (screen y grows downward)
pub const PARTICLE_UPWARD_BIAS: f32 = 2.0;
/// Added to vy every step
pub const PARTICLE_GRAVITY: f32 = 0.1;

pub const PARTICLE_DECAY_MIN: f32 = 0.01;
pub const PARTICLE_DECAY_RANGE: f32 = 0.015;
pub const PARTICLE_RADIUS_MIN: f32 = 1.0;
pub const PARTICLE_RADIUS_RANGE: f32 = 2.0;

/// Firework palette as sRGB bytes
pub const FIREWORK_PALETTE: [[u8; 3]; 6] = [
    [0xff, 0x9a, 0xa2],
    [0xff, 0xb7, 0xb2],
    [0xff, 0xda, 0xc1],
    [0xff, 0xd7, 0x00],
    [0xff, 0x6b, 0x6b],
    [0x4e, 0xcd, 0xc4],
];

/// Firework surface covers this fraction of the window, anchored to the bottom
pub const FIREWORK_SURFACE_FRACTION: f32 = 0.3;
/// Bursts are placed between these fractions of the firework surface height
pub const BURST_Y_MIN_FRACTION: f32 = 0.1;
pub const BURST_Y_RANGE_FRACTION: f32 = 0.5;

// ============================================================================
// FIREWORK SHOW DEFAULTS
// ============================================================================

pub const DEFAULT_SHOW_SECS: f32 = 3.0;
pub const DEFAULT_CLEANUP_SECS: f32 = 2.0;
pub const DEFAULT_BURST_INTERVAL_SECS: f32 = 0.5;

// ============================================================================
// STARFIELD
// ============================================================================

pub const DEFAULT_STAR_COUNT: usize = 200;
pub const STAR_RADIUS_MIN: f32 = 1.0;
pub const STAR_RADIUS_RANGE: f32 = 2.0;
pub const STAR_SPEED_MIN: f32 = 0.1;
pub const STAR_SPEED_RANGE: f32 = 0.5;
pub const STAR_OPACITY_MIN: f32 = 0.2;
pub const STAR_OPACITY_RANGE: f32 = 0.8;
/// Gold
pub const STAR_COLOR: [u8; 3] = [255, 215, 0];

// ============================================================================
// TRIGGERS AND PAGE
// ============================================================================

pub const DEFAULT_SCROLL_BOTTOM_MARGIN: f32 = 50.0;
pub const DEFAULT_SCROLL_REARM_SECS: f32 = 5.0;
/// Pixels scrolled per wheel "line"
pub const SCROLL_LINE_HEIGHT: f32 = 40.0;

pub const COUNTDOWN_TICK_SECS: f32 = 1.0;

/// Fraction of a timeline item that must be on screen before it is revealed
pub const REVEAL_THRESHOLD: f32 = 0.1;
/// Viewport bottom is pulled up by this much for reveal checks
pub const REVEAL_BOTTOM_INSET: f32 = 50.0;
pub const REVEAL_FADE_SECS: f32 = 0.6;

pub const BUTTON_PRESS_FEEDBACK_SECS: f32 = 0.15;
pub const MUSIC_PULSE_PERIOD_SECS: f32 = 2.0;

/// Side length of the generated circle texture used for stars and particles
pub const CIRCLE_TEXTURE_SIZE: u32 = 32;

// Render layers (z)
pub const STARFIELD_Z: f32 = 0.0;
pub const FIREWORKS_Z: f32 = 10.0;
