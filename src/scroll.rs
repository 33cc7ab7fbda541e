// Page scrolling and the scroll-to-bottom firework trigger

use std::time::Duration;

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::ui::{ComputedNode, ScrollPosition};

use crate::config::{PageConfig, ScrollConfig};
use crate::constants::*;
use crate::triggers::{StartFireworks, TriggerSource};

/// The scrolling container that fills the window
#[derive(Component)]
pub struct PageScroll;

/// The single content column inside `PageScroll`
#[derive(Component)]
pub struct PageContent;

/// Scroll state in logical pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub viewport_height: f32,
    pub content_height: f32,
}

impl ScrollMetrics {
    pub fn max_scroll(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    /// Content that fits in the window has no bottom to reach
    pub fn is_near_bottom(&self, margin: f32) -> bool {
        self.max_scroll() > 0.0
            && self.scroll_top + self.viewport_height >= self.content_height - margin
    }
}

/// Fires once when the page is scrolled near the bottom, then stays quiet
/// until the re-arm cooldown has passed
#[derive(Resource, Debug)]
pub struct ScrollTrigger {
    armed: bool,
    margin: f32,
    rearm: Timer,
}

impl ScrollTrigger {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            armed: true,
            margin: config.bottom_margin,
            rearm: Timer::from_seconds(config.rearm_secs, TimerMode::Once),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns true when this scroll should start fireworks
    pub fn check(&mut self, metrics: ScrollMetrics) -> bool {
        if !self.armed || !metrics.is_near_bottom(self.margin) {
            return false;
        }
        self.armed = false;
        self.rearm.reset();
        true
    }

    pub fn tick(&mut self, delta: Duration) {
        if self.armed {
            return;
        }
        self.rearm.tick(delta);
        if self.rearm.finished() {
            self.armed = true;
        }
    }
}

impl FromWorld for ScrollTrigger {
    fn from_world(world: &mut World) -> Self {
        let config = world
            .get_resource::<PageConfig>()
            .map(|c| c.scroll.clone())
            .unwrap_or_default();
        Self::new(&config)
    }
}

pub struct ScrollPlugin;

impl Plugin for ScrollPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScrollTrigger>()
            .add_systems(Update, (rearm_scroll_trigger, scroll_page).chain());
    }
}

fn rearm_scroll_trigger(time: Res<Time>, mut trigger: ResMut<ScrollTrigger>) {
    let was_armed = trigger.is_armed();
    trigger.tick(time.delta());
    if !was_armed && trigger.is_armed() {
        debug!("Scroll trigger re-armed");
    }
}

/// Apply mouse-wheel input to the page and check for the bottom
fn scroll_page(
    mut wheel_events: EventReader<MouseWheel>,
    mut trigger: ResMut<ScrollTrigger>,
    mut start_events: EventWriter<StartFireworks>,
    mut page_query: Query<(&mut ScrollPosition, &ComputedNode), With<PageScroll>>,
    content_query: Query<&ComputedNode, (With<PageContent>, Without<PageScroll>)>,
) {
    let mut delta = 0.0;
    let mut scrolled = false;
    for event in wheel_events.read() {
        scrolled = true;
        delta -= match event.unit {
            MouseScrollUnit::Line => event.y * SCROLL_LINE_HEIGHT,
            MouseScrollUnit::Pixel => event.y,
        };
    }
    if !scrolled {
        return;
    }

    let Ok((mut position, page_node)) = page_query.single_mut() else {
        return;
    };
    let Ok(content_node) = content_query.single() else {
        return;
    };

    let mut metrics = ScrollMetrics {
        scroll_top: position.offset_y,
        viewport_height: page_node.size().y * page_node.inverse_scale_factor(),
        content_height: content_node.size().y * content_node.inverse_scale_factor(),
    };
    metrics.scroll_top = (metrics.scroll_top + delta).clamp(0.0, metrics.max_scroll());
    position.offset_y = metrics.scroll_top;

    if trigger.check(metrics) {
        info!("📜 Scrolled to the bottom");
        start_events.write(StartFireworks {
            source: TriggerSource::ScrollBottom,
        });
    }
}
