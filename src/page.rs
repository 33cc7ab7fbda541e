// Page layout: camera, scrolling content column and the fixed control buttons

use bevy::prelude::*;
use bevy::ui::ScrollPosition;

use crate::config::PageConfig;
use crate::countdown::{CountdownDigit, CountdownHeading, CountdownUnit};
use crate::music::{MusicButton, MusicButtonLabel, MUSIC_BUTTON_COLOR};
use crate::scroll::{PageContent, PageScroll};
use crate::timeline::TimelineContainer;
use crate::triggers::{FireworksButton, FIREWORKS_BUTTON_COLOR};

const NIGHT_SKY: Color = Color::srgb(0.03, 0.03, 0.09);
const HEADING_COLOR: Color = Color::srgb(1.0, 0.85, 0.87);
const DIGIT_COLOR: Color = Color::srgb(1.0, 0.84, 0.0);
const LABEL_COLOR: Color = Color::srgb(0.8, 0.8, 0.9);
const PANEL_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.06);
const BUTTON_TEXT_COLOR: Color = Color::srgb(0.1, 0.05, 0.1);

pub struct PageLayoutPlugin;

impl Plugin for PageLayoutPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(NIGHT_SKY))
            .add_systems(Startup, (spawn_camera, spawn_page, spawn_controls));
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, Name::new("PageCamera")));
}

fn spawn_page(mut commands: Commands, config: Res<PageConfig>) {
    let root = commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                overflow: Overflow::scroll_y(),
                ..default()
            },
            ScrollPosition::default(),
            PageScroll,
            Name::new("PageScroll"),
        ))
        .id();

    let content = commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                max_width: Val::Px(760.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                flex_shrink: 0.0,
                padding: UiRect::axes(Val::Px(24.0), Val::Px(48.0)),
                row_gap: Val::Px(32.0),
                ..default()
            },
            PageContent,
        ))
        .id();
    commands.entity(root).add_child(content);

    let heading = commands
        .spawn((
            Text::new(config.countdown.heading.clone()),
            TextFont {
                font_size: 40.0,
                ..default()
            },
            TextColor(HEADING_COLOR),
            CountdownHeading,
        ))
        .id();

    let digits = spawn_countdown_row(&mut commands);

    let timeline_title = commands
        .spawn((
            Text::new("Our timeline"),
            TextFont {
                font_size: 30.0,
                ..default()
            },
            TextColor(HEADING_COLOR),
        ))
        .id();

    let timeline = commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(18.0),
                ..default()
            },
            TimelineContainer,
        ))
        .id();

    // Room to scroll past the timeline, so reaching the bottom is deliberate
    let footer = commands
        .spawn(Node {
            height: Val::Vh(60.0),
            align_items: AlignItems::FlexEnd,
            ..default()
        })
        .with_children(|footer| {
            footer.spawn((
                Text::new("Keep scrolling for a surprise"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(LABEL_COLOR),
            ));
        })
        .id();

    commands
        .entity(content)
        .add_children(&[heading, digits, timeline_title, timeline, footer]);
}

fn spawn_countdown_row(commands: &mut Commands) -> Entity {
    let row = commands
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            column_gap: Val::Px(16.0),
            ..default()
        })
        .id();

    for unit in CountdownUnit::ALL {
        let cell = commands
            .spawn((
                Node {
                    width: Val::Px(110.0),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    padding: UiRect::all(Val::Px(12.0)),
                    ..default()
                },
                BackgroundColor(PANEL_COLOR),
                BorderRadius::all(Val::Px(12.0)),
            ))
            .with_children(|cell| {
                cell.spawn((
                    Text::new("00"),
                    TextFont {
                        font_size: 44.0,
                        ..default()
                    },
                    TextColor(DIGIT_COLOR),
                    CountdownDigit(unit),
                ));
                cell.spawn((
                    Text::new(unit.label()),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(LABEL_COLOR),
                ));
            })
            .id();
        commands.entity(row).add_child(cell);
    }

    row
}

/// Music and fireworks buttons pinned to the bottom-right corner
fn spawn_controls(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(20.0),
                bottom: Val::Px(20.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(12.0),
                ..default()
            },
            GlobalZIndex(10),
            Name::new("Controls"),
        ))
        .with_children(|controls| {
            controls
                .spawn((control_button(), BackgroundColor(MUSIC_BUTTON_COLOR), MusicButton))
                .with_children(|button| {
                    button.spawn((control_label("Play music"), MusicButtonLabel));
                });

            controls
                .spawn((
                    control_button(),
                    BackgroundColor(FIREWORKS_BUTTON_COLOR),
                    FireworksButton,
                ))
                .with_children(|button| {
                    button.spawn(control_label("Fireworks"));
                });
        });
}

fn control_button() -> impl Bundle {
    (
        Button,
        Node {
            width: Val::Px(140.0),
            height: Val::Px(44.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BorderRadius::all(Val::Px(22.0)),
    )
}

fn control_label(text: &str) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(BUTTON_TEXT_COLOR),
    )
}
