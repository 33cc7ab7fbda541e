// Timeline list loaded once from JSON, revealed as items scroll into view

use std::path::Path;

use bevy::prelude::*;
use bevy::ui::ComputedNode;
use serde::{Deserialize, Serialize};

use crate::config::PageConfig;
use crate::constants::*;
use crate::error::PageError;
use crate::surface::Viewport;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: String,
    pub title: String,
    #[serde(rename = "desc", alias = "description", default)]
    pub description: String,
}

pub fn parse_timeline(json: &str) -> Result<Vec<TimelineEntry>, PageError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_timeline(path: &Path) -> Result<Vec<TimelineEntry>, PageError> {
    let json = std::fs::read_to_string(path).map_err(|e| PageError::io(path, e))?;
    parse_timeline(&json)
}

/// Fraction of an item's height inside the root band `[root_top, root_bottom]`
pub fn visible_fraction(item_top: f32, item_height: f32, root_top: f32, root_bottom: f32) -> f32 {
    if item_height <= 0.0 {
        return 0.0;
    }
    let overlap = (item_top + item_height).min(root_bottom) - item_top.max(root_top);
    (overlap / item_height).clamp(0.0, 1.0)
}

/// Column the entries are rendered into
#[derive(Component)]
pub struct TimelineContainer;

/// Fade-in state of one rendered entry. Once revealed it stays revealed.
#[derive(Component, Debug, Default)]
pub struct TimelineItem {
    pub revealed: bool,
    /// 0.0 hidden .. 1.0 fully shown
    pub progress: f32,
}

const ITEM_BACKGROUND: Color = Color::srgba(1.0, 1.0, 1.0, 0.08);
const DATE_COLOR: Color = Color::srgb(1.0, 0.84, 0.0);
const TITLE_COLOR: Color = Color::srgb(1.0, 0.85, 0.87);
const BODY_COLOR: Color = Color::srgb(0.85, 0.85, 0.92);

pub struct TimelinePlugin;

impl Plugin for TimelinePlugin {
    fn build(&self, app: &mut App) {
        // The container is spawned during Startup
        app.add_systems(PostStartup, populate_timeline)
            .add_systems(Update, (reveal_timeline_items, fade_timeline_items).chain());
    }
}

fn populate_timeline(
    mut commands: Commands,
    config: Res<PageConfig>,
    container_query: Query<Entity, With<TimelineContainer>>,
) {
    let entries = match load_timeline(&config.assets.timeline) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to load timeline: {}", e);
            return;
        }
    };

    let Ok(container) = container_query.single() else {
        warn!("No timeline container on the page");
        return;
    };

    for entry in &entries {
        let item = spawn_timeline_item(&mut commands, entry);
        commands.entity(container).add_child(item);
    }
    info!("📅 Loaded {} timeline entries", entries.len());
}

fn spawn_timeline_item(commands: &mut Commands, entry: &TimelineEntry) -> Entity {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(16.0)),
                row_gap: Val::Px(6.0),
                ..default()
            },
            BackgroundColor(ITEM_BACKGROUND.with_alpha(0.0)),
            TimelineItem::default(),
        ))
        .with_children(|item| {
            item.spawn((
                Text::new(entry.date.clone()),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(DATE_COLOR.with_alpha(0.0)),
            ));
            item.spawn((
                Text::new(entry.title.clone()),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(TITLE_COLOR.with_alpha(0.0)),
            ));
            item.spawn((
                Text::new(entry.description.clone()),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(BODY_COLOR.with_alpha(0.0)),
            ));
        })
        .id()
}

/// Mark items revealed once enough of them is on screen
fn reveal_timeline_items(
    viewport: Res<Viewport>,
    mut items: Query<(&mut TimelineItem, &ComputedNode, &GlobalTransform)>,
) {
    let root_bottom = viewport.size.y - REVEAL_BOTTOM_INSET;

    for (mut item, node, transform) in items.iter_mut() {
        if item.revealed {
            continue;
        }

        // Layout positions are node centers in physical pixels
        let scale = node.inverse_scale_factor();
        let height = node.size().y * scale;
        let top = transform.translation().y * scale - height / 2.0;

        if visible_fraction(top, height, 0.0, root_bottom) >= REVEAL_THRESHOLD {
            item.revealed = true;
            debug!("Timeline item revealed at y={:.0}", top);
        }
    }
}

fn fade_timeline_items(
    time: Res<Time>,
    mut items: Query<(&mut TimelineItem, &mut BackgroundColor, &Children)>,
    mut texts: Query<&mut TextColor>,
) {
    let step = time.delta_secs() / REVEAL_FADE_SECS;

    for (mut item, mut background, children) in items.iter_mut() {
        if !item.revealed || item.progress >= 1.0 {
            continue;
        }

        item.progress = (item.progress + step).min(1.0);
        background.0 = ITEM_BACKGROUND.with_alpha(ITEM_BACKGROUND.alpha() * item.progress);

        for &child in &children[..] {
            if let Ok(mut color) = texts.get_mut(child) {
                color.0.set_alpha(item.progress);
            }
        }
    }
}
