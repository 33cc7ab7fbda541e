// Countdown to the configured local date-time
// Refreshes the day/hour/minute/second digits once a second; when the target
// passes it swaps the heading for the completion message and starts fireworks

use bevy::prelude::*;
use chrono::{DateTime, Local, NaiveDateTime};

use crate::config::PageConfig;
use crate::constants::*;
use crate::error::PageError;
use crate::triggers::{StartFireworks, TriggerSource};

const TARGET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Remaining time split into display units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownParts {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl CountdownParts {
    /// Split a non-negative millisecond distance
    pub fn from_millis(distance: i64) -> Self {
        Self {
            days: distance / MS_PER_DAY,
            hours: (distance % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (distance % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (distance % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    pub fn get(&self, unit: CountdownUnit) -> i64 {
        match unit {
            CountdownUnit::Days => self.days,
            CountdownUnit::Hours => self.hours,
            CountdownUnit::Minutes => self.minutes,
            CountdownUnit::Seconds => self.seconds,
        }
    }
}

/// Two-digit display; values of 100+ days keep all their digits
pub fn pad_zero(value: i64) -> String {
    format!("{:02}", value)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl CountdownUnit {
    pub const ALL: [CountdownUnit; 4] = [
        CountdownUnit::Days,
        CountdownUnit::Hours,
        CountdownUnit::Minutes,
        CountdownUnit::Seconds,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CountdownUnit::Days => "Days",
            CountdownUnit::Hours => "Hours",
            CountdownUnit::Minutes => "Minutes",
            CountdownUnit::Seconds => "Seconds",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownTick {
    Remaining(CountdownParts),
    /// Target passed; reported exactly once
    Completed,
}

/// Parse `YYYY-MM-DDTHH:MM:SS` as local time
pub fn parse_target(text: &str) -> Result<DateTime<Local>, PageError> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), TARGET_FORMAT)
        .map_err(|_| PageError::CountdownTarget(text.to_string()))?;
    naive
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| PageError::CountdownTarget(text.to_string()))
}

#[derive(Resource, Debug)]
pub struct Countdown {
    target: DateTime<Local>,
    timer: Timer,
    finished: bool,
}

impl Countdown {
    pub fn new(target: DateTime<Local>) -> Self {
        Self {
            target,
            timer: Timer::from_seconds(COUNTDOWN_TICK_SECS, TimerMode::Repeating),
            finished: false,
        }
    }

    pub fn target(&self) -> DateTime<Local> {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Compare against `now`. Returns `None` once the countdown has completed.
    pub fn evaluate(&mut self, now: DateTime<Local>) -> Option<CountdownTick> {
        if self.finished {
            return None;
        }

        let distance = (self.target - now).num_milliseconds();
        if distance < 0 {
            self.finished = true;
            return Some(CountdownTick::Completed);
        }

        Some(CountdownTick::Remaining(CountdownParts::from_millis(distance)))
    }
}

impl FromWorld for Countdown {
    fn from_world(world: &mut World) -> Self {
        let text = world
            .get_resource::<PageConfig>()
            .map(|c| c.countdown.target.clone())
            .unwrap_or_else(|| PageConfig::default().countdown.target);

        let target = match parse_target(&text) {
            Ok(target) => target,
            Err(e) => {
                // Falls back to the built-in date, which always parses
                warn!("{}", e);
                parse_target(&PageConfig::default().countdown.target).unwrap_or_else(|_| Local::now())
            }
        };
        Countdown::new(target)
    }
}

// ============================================================================
// UI
// ============================================================================

/// Heading above the digits; replaced by the completion message
#[derive(Component)]
pub struct CountdownHeading;

/// Text showing one unit of the remaining time
#[derive(Component)]
pub struct CountdownDigit(pub CountdownUnit);

pub struct CountdownPlugin;

impl Plugin for CountdownPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Countdown>()
            // The page UI is spawned in Startup; the first check must see it
            .add_systems(PostStartup, refresh_countdown)
            .add_systems(Update, tick_countdown);
    }
}

fn tick_countdown(
    time: Res<Time>,
    mut countdown: ResMut<Countdown>,
    config: Res<PageConfig>,
    start_events: EventWriter<StartFireworks>,
    headings: Query<&mut Text, (With<CountdownHeading>, Without<CountdownDigit>)>,
    digits: Query<(&CountdownDigit, &mut Text), Without<CountdownHeading>>,
) {
    if countdown.is_finished() {
        return;
    }

    countdown.timer.tick(time.delta());
    if countdown.timer.just_finished() {
        apply_countdown(&mut countdown, &config, start_events, headings, digits);
    }
}

fn refresh_countdown(
    mut countdown: ResMut<Countdown>,
    config: Res<PageConfig>,
    start_events: EventWriter<StartFireworks>,
    headings: Query<&mut Text, (With<CountdownHeading>, Without<CountdownDigit>)>,
    digits: Query<(&CountdownDigit, &mut Text), Without<CountdownHeading>>,
) {
    info!("⏳ Counting down to {}", countdown.target().format("%Y-%m-%d %H:%M:%S"));
    apply_countdown(&mut countdown, &config, start_events, headings, digits);
}

fn apply_countdown(
    countdown: &mut Countdown,
    config: &PageConfig,
    mut start_events: EventWriter<StartFireworks>,
    mut headings: Query<&mut Text, (With<CountdownHeading>, Without<CountdownDigit>)>,
    mut digits: Query<(&CountdownDigit, &mut Text), Without<CountdownHeading>>,
) {
    match countdown.evaluate(Local::now()) {
        Some(CountdownTick::Remaining(parts)) => {
            for (digit, mut text) in digits.iter_mut() {
                **text = pad_zero(parts.get(digit.0));
            }
        }
        Some(CountdownTick::Completed) => {
            info!("🎉 Countdown finished");
            for mut text in headings.iter_mut() {
                **text = config.countdown.completed_message.clone();
            }
            start_events.write(StartFireworks {
                source: TriggerSource::Countdown,
            });
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_parts_from_millis() {
        let distance = 3 * MS_PER_DAY + 4 * MS_PER_HOUR + 5 * MS_PER_MINUTE + 6 * MS_PER_SECOND + 999;
        let parts = CountdownParts::from_millis(distance);
        assert_eq!(
            parts,
            CountdownParts {
                days: 3,
                hours: 4,
                minutes: 5,
                seconds: 6
            }
        );
    }

    #[test]
    fn test_parts_of_zero() {
        let parts = CountdownParts::from_millis(0);
        assert_eq!(parts.get(CountdownUnit::Days), 0);
        assert_eq!(parts.get(CountdownUnit::Seconds), 0);
    }

    #[test]
    fn test_pad_zero() {
        assert_eq!(pad_zero(0), "00");
        assert_eq!(pad_zero(7), "07");
        assert_eq!(pad_zero(10), "10");
        assert_eq!(pad_zero(365), "365");
    }

    #[test]
    fn test_parse_target() {
        let target = parse_target("2025-08-29T00:00:00").unwrap();
        assert_eq!(target.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-08-29 00:00:00");

        assert!(matches!(
            parse_target("next tuesday"),
            Err(PageError::CountdownTarget(_))
        ));
    }

    #[test]
    fn test_future_target_reports_remaining() {
        let now = Local::now();
        let mut countdown = Countdown::new(now + TimeDelta::hours(26) + TimeDelta::seconds(30));

        match countdown.evaluate(now) {
            Some(CountdownTick::Remaining(parts)) => {
                assert_eq!(parts.days, 1);
                assert_eq!(parts.hours, 2);
                assert_eq!(parts.minutes, 0);
                assert_eq!(parts.seconds, 30);
            }
            other => panic!("expected remaining time, got {:?}", other),
        }
        assert!(!countdown.is_finished());
    }

    #[test]
    fn test_past_target_completes_exactly_once() {
        let now = Local::now();
        let mut countdown = Countdown::new(now - TimeDelta::hours(1));

        assert_eq!(countdown.evaluate(now), Some(CountdownTick::Completed));
        assert!(countdown.is_finished());
        assert_eq!(countdown.evaluate(now), None);
        assert_eq!(countdown.evaluate(now + TimeDelta::seconds(5)), None);
    }

    fn countdown_app(target: &str) -> App {
        let mut config = PageConfig::default();
        config.countdown.target = target.to_string();
        config.countdown.completed_message = "It's time!".to_string();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(config)
            .add_event::<StartFireworks>()
            .add_event::<crate::triggers::StopFireworks>()
            .init_resource::<crate::surface::Viewport>()
            .add_plugins((CountdownPlugin, crate::fireworks::FireworksPlugin));
        app
    }

    fn text_of(app: &App, entity: Entity) -> String {
        app.world().get::<Text>(entity).unwrap().0.clone()
    }

    #[test]
    fn test_past_target_starts_fireworks_at_startup() {
        let mut app = countdown_app("2000-01-01T00:00:00");
        let heading = app
            .world_mut()
            .spawn((Text::new("Counting down"), CountdownHeading))
            .id();

        app.update();
        assert_eq!(text_of(&app, heading), "It's time!");
        let show = app.world().resource::<crate::fireworks::FireworkShow>();
        assert!(show.is_active());
        assert_eq!(show.session(), 1);

        // Later frames neither rewrite the heading nor restart the show
        app.world_mut().get_mut::<Text>(heading).unwrap().0 = "edited".to_string();
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(text_of(&app, heading), "edited");
        assert_eq!(
            app.world().resource::<crate::fireworks::FireworkShow>().session(),
            1
        );
    }

    #[test]
    fn test_future_target_fills_digits_at_startup() {
        let target = Local::now() + TimeDelta::days(2) + TimeDelta::hours(1);
        let mut app = countdown_app(&target.format(TARGET_FORMAT).to_string());
        let heading = app
            .world_mut()
            .spawn((Text::new("Counting down"), CountdownHeading))
            .id();
        let days = app
            .world_mut()
            .spawn((Text::new("00"), CountdownDigit(CountdownUnit::Days)))
            .id();

        app.update();
        assert_eq!(text_of(&app, days), "02");
        assert_eq!(text_of(&app, heading), "Counting down");

        let show = app.world().resource::<crate::fireworks::FireworkShow>();
        assert!(!show.is_active());
        assert_eq!(show.session(), 0);
    }

    #[test]
    fn test_exact_target_is_not_yet_complete() {
        let now = Local::now();
        let mut countdown = Countdown::new(now);
        assert!(matches!(
            countdown.evaluate(now),
            Some(CountdownTick::Remaining(_))
        ));
        assert_eq!(
            countdown.evaluate(now + TimeDelta::milliseconds(1)),
            Some(CountdownTick::Completed)
        );
    }
}
