//! Light and sound sequences expressed as data.
//!
//! A [`Step`] list is played by either board flavour; keeping the sequences
//! here means the blocking and async drivers cannot drift apart, and tests can
//! inspect a show without sleeping through it.
use crate::Command;
use std::time::Duration;

pub const DEMO_CYCLES: usize = 5;
pub const FINALE_FLASHES: usize = 3;
pub const SELF_TEST_PATTERNS: usize = 3;

pub const PHYSICAL_BUTTON_NOTE: &str = "The physical button sends 'Enter' key when pressed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Write one command byte.
    Send(Command),
    /// Hold off before the next step.
    Wait(Duration),
    /// A progress line for whoever is watching.
    Say(String),
}

/// Chainable helper for writing sequences.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    steps: Vec<Step>,
}

impl ScriptBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn send(mut self, command: Command) -> Self {
        self.steps.push(Step::Send(command));
        self
    }

    /// Sends the command and narrates it first, the way the tester does.
    #[must_use]
    pub fn announce(self, command: Command) -> Self {
        self.say(command.describe()).send(command)
    }

    #[must_use]
    pub fn wait_ms(mut self, millis: u64) -> Self {
        self.steps.push(Step::Wait(Duration::from_millis(millis)));
        self
    }

    #[must_use]
    pub fn say(mut self, line: impl Into<String>) -> Self {
        self.steps.push(Step::Say(line.into()));
        self
    }

    #[must_use]
    pub fn then(mut self, other: Self) -> Self {
        self.steps.extend(other.steps);
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<Step> {
        self.steps
    }
}

/// The stand-alone light and sound show.
#[must_use]
pub fn demo_show() -> Vec<Step> {
    let mut script = ScriptBuilder::new()
        .say("Big Internet Button Demo - Connected!")
        .say("Running light and sound show...");

    for cycle in 1..=DEMO_CYCLES {
        script = script
            .say(format!("Cycle {cycle}/{DEMO_CYCLES}"))
            .send(Command::LedOn)
            .wait_ms(300)
            .send(Command::BeepHigh)
            .wait_ms(200)
            .send(Command::LedOff)
            .wait_ms(200)
            .send(Command::BeepLow)
            .wait_ms(500);
    }

    script = script.say("Grand finale!");
    for _ in 0..FINALE_FLASHES {
        // LED and beep go out back to back on purpose.
        script = script
            .send(Command::LedOn)
            .send(Command::BeepHigh)
            .wait_ms(100)
            .send(Command::LedOff)
            .wait_ms(100);
    }

    script
        .send(Command::LedOn)
        .wait_ms(1000)
        .send(Command::LedOff)
        .say("Demo complete!")
        .say("")
        .say(PHYSICAL_BUTTON_NOTE)
        .say("Try pressing it with a text editor open!")
        .build()
}

/// One of everything with long gaps, then a few tighter flash-and-beep rounds.
#[must_use]
pub fn self_test() -> Vec<Step> {
    let mut script = ScriptBuilder::new()
        .say("1. LED ON test")
        .announce(Command::LedOn)
        .wait_ms(1000)
        .say("")
        .say("2. High F beep test")
        .announce(Command::BeepHigh)
        .wait_ms(1000)
        .say("")
        .say("3. Middle G# beep test")
        .announce(Command::BeepLow)
        .wait_ms(1000)
        .say("")
        .say("4. LED OFF test")
        .announce(Command::LedOff)
        .wait_ms(1000)
        .say("")
        .say("5. Running pattern: Flash + Beeps...");

    for round in 1..=SELF_TEST_PATTERNS {
        script = script
            .say(format!("  Pattern {round}..."))
            .announce(Command::LedOn)
            .wait_ms(200)
            .announce(Command::BeepHigh)
            .wait_ms(200)
            .announce(Command::LedOff)
            .wait_ms(200)
            .announce(Command::BeepLow)
            .say(format!("  Pattern {round} done"))
            .wait_ms(500);
    }

    script.say("").say("Test complete!").build()
}

/// The `p` macro of the interactive loop.
#[must_use]
pub fn quick_pattern() -> Vec<Step> {
    ScriptBuilder::new()
        .say("Running pattern...")
        .announce(Command::LedOn)
        .wait_ms(100)
        .announce(Command::BeepHigh)
        .wait_ms(100)
        .announce(Command::LedOff)
        .wait_ms(100)
        .announce(Command::BeepLow)
        .build()
}

/// A single narrated command.
#[must_use]
pub fn single(command: Command) -> Vec<Step> {
    ScriptBuilder::new().announce(command).build()
}

/// The commands a script writes, in order.
pub fn commands(steps: &[Step]) -> impl Iterator<Item = Command> + '_ {
    steps.iter().filter_map(|step| match step {
        Step::Send(command) => Some(*command),
        _ => None,
    })
}

/// Sum of all waits in a script.
#[must_use]
pub fn running_time(steps: &[Step]) -> Duration {
    steps
        .iter()
        .filter_map(|step| match step {
            Step::Wait(duration) => Some(*duration),
            _ => None,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Command::{BeepHigh, BeepLow, LedOff, LedOn};

    #[test]
    fn demo_writes_cycles_then_finale_then_hold() {
        let written: Vec<Command> = commands(&demo_show()).collect();
        assert_eq!(written.len(), DEMO_CYCLES * 4 + FINALE_FLASHES * 3 + 2);

        let (cycles, rest) = written.split_at(DEMO_CYCLES * 4);
        for cycle in cycles.chunks(4) {
            assert_eq!(cycle, [LedOn, BeepHigh, LedOff, BeepLow]);
        }
        let (finale, hold) = rest.split_at(FINALE_FLASHES * 3);
        for flash in finale.chunks(3) {
            assert_eq!(flash, [LedOn, BeepHigh, LedOff]);
        }
        assert_eq!(hold, [LedOn, LedOff]);
    }

    #[test]
    fn demo_running_time_matches_the_choreography() {
        // 5 * 1.2s + 3 * 0.2s + 1s
        assert_eq!(running_time(&demo_show()), Duration::from_millis(7600));
    }

    #[test]
    fn demo_reports_every_cycle() {
        let lines: Vec<String> = demo_show()
            .into_iter()
            .filter_map(|step| match step {
                Step::Say(line) if line.starts_with("Cycle") => Some(line),
                _ => None,
            })
            .collect();
        assert_eq!(lines.first().map(String::as_str), Some("Cycle 1/5"));
        assert_eq!(lines.last().map(String::as_str), Some("Cycle 5/5"));
        assert_eq!(lines.len(), DEMO_CYCLES);
    }

    #[test]
    fn self_test_checks_each_action_alone_first() {
        let steps = self_test();
        let written: Vec<Command> = commands(&steps).collect();
        assert_eq!(&written[..4], [LedOn, BeepHigh, BeepLow, LedOff]);
        assert_eq!(written.len(), 4 + SELF_TEST_PATTERNS * 4);

        let first_wait = steps.iter().find_map(|step| match step {
            Step::Wait(duration) => Some(*duration),
            _ => None,
        });
        assert_eq!(first_wait, Some(Duration::from_secs(1)));
    }

    #[test]
    fn quick_pattern_order_is_fixed() {
        let steps = quick_pattern();
        let written: Vec<Command> = commands(&steps).collect();
        assert_eq!(written, [LedOn, BeepHigh, LedOff, BeepLow]);
        assert_eq!(running_time(&steps), Duration::from_millis(300));
        assert!(!matches!(steps.last(), Some(Step::Wait(_))));
    }

    #[test]
    fn single_narrates_then_sends() {
        assert_eq!(
            single(BeepLow),
            [
                Step::Say(BeepLow.describe().to_string()),
                Step::Send(BeepLow)
            ]
        );
    }
}
