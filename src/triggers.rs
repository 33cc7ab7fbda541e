// Start/stop signals for the firework show
// Countdown, scroll detector and the fireworks button all write StartFireworks

use bevy::prelude::*;

use crate::constants::*;

/// Who asked for the show; only used for logging
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerSource {
    Countdown,
    ScrollBottom,
    Manual,
}

/// Start (or restart) the firework show
#[derive(Event, Clone, Copy, Debug)]
pub struct StartFireworks {
    pub source: TriggerSource,
}

/// Stop emitting and begin draining
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct StopFireworks;

/// Manual trigger button
#[derive(Component)]
pub struct FireworksButton;

/// Brief darkening after a click
#[derive(Component)]
pub struct PressFeedback(pub Timer);

pub const FIREWORKS_BUTTON_COLOR: Color = Color::srgba(1.0, 0.84, 0.0, 0.85);
const FIREWORKS_BUTTON_PRESSED: Color = Color::srgba(0.7, 0.58, 0.0, 0.95);

pub struct TriggerPlugin;

impl Plugin for TriggerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StartFireworks>()
            .add_event::<StopFireworks>()
            .add_systems(
                Update,
                (stop_on_escape, handle_fireworks_button, release_press_feedback),
            );
    }
}

fn stop_on_escape(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut stop_events: EventWriter<StopFireworks>,
) {
    if keyboard_input.just_pressed(KeyCode::Escape) {
        stop_events.write(StopFireworks);
    }
}

fn handle_fireworks_button(
    mut commands: Commands,
    mut interactions: Query<
        (Entity, &Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<FireworksButton>),
    >,
    mut start_events: EventWriter<StartFireworks>,
) {
    for (entity, interaction, mut background) in interactions.iter_mut() {
        if *interaction != Interaction::Pressed {
            continue;
        }

        start_events.write(StartFireworks {
            source: TriggerSource::Manual,
        });
        background.0 = FIREWORKS_BUTTON_PRESSED;
        commands.entity(entity).insert(PressFeedback(Timer::from_seconds(
            BUTTON_PRESS_FEEDBACK_SECS,
            TimerMode::Once,
        )));
    }
}

fn release_press_feedback(
    time: Res<Time>,
    mut commands: Commands,
    mut buttons: Query<(Entity, &mut PressFeedback, &mut BackgroundColor)>,
) {
    for (entity, mut feedback, mut background) in buttons.iter_mut() {
        feedback.0.tick(time.delta());
        if feedback.0.finished() {
            background.0 = FIREWORKS_BUTTON_COLOR;
            commands.entity(entity).remove::<PressFeedback>();
        }
    }
}
