//! Whole-engine properties under random configurations and steering

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use quiz_arcade::sim::CarrierState;
use quiz_arcade::{
    Engine, EngineConfig, GameEvent, Playfield, Question, SelectionPolicy, TickInput, TravelAxis,
};

const FRAMES_PER_STEP: usize = 30;

#[derive(Debug, Clone)]
enum Steer {
    Lane(u8),
    Thrust(f32),
    Autopilot,
    Idle,
}

#[derive(Debug, Clone)]
struct Case {
    seed: u64,
    lanes: usize,
    max_active: usize,
    cooldown: (f32, f32),
    lives: u32,
    delay: f32,
    weighted: bool,
    left: bool,
    correct: [usize; 3],
    steering: Vec<Steer>,
    dts: Vec<f32>,
}

fn steer() -> impl Strategy<Value = Steer> {
    prop_oneof![
        any::<u8>().prop_map(Steer::Lane),
        (-1.0f32..=1.0).prop_map(Steer::Thrust),
        Just(Steer::Autopilot),
        Just(Steer::Idle),
    ]
}

fn case() -> impl Strategy<Value = Case> {
    (
        any::<u64>(),
        2usize..=5,
        1usize..=4,
        (0.1f32..0.8, 0.0f32..1.0),
        1u32..=4,
        0.0f32..0.6,
        any::<bool>(),
        any::<bool>(),
        [0usize..4, 0usize..4, 0usize..4],
        prop::collection::vec(steer(), 10..30),
        prop::collection::vec(0.005f32..0.033, 1..8),
    )
        .prop_map(
            |(
                seed,
                lanes,
                max_active,
                (min, span),
                lives,
                delay,
                weighted,
                left,
                correct,
                steering,
                dts,
            )| Case {
                seed,
                lanes,
                max_active,
                cooldown: (min, min + span),
                lives,
                delay,
                weighted,
                left,
                correct,
                steering,
                dts,
            },
        )
}

fn bank(correct: [usize; 3]) -> Vec<Question> {
    correct
        .iter()
        .enumerate()
        .map(|(i, &c)| Question::new(format!("Q{i}"), ["w", "x", "y", "z"], c))
        .collect()
}

fn input_for(steer: &Steer, lanes: usize) -> TickInput {
    match *steer {
        Steer::Lane(lane) => TickInput {
            desired_lane: Some(lane as usize % lanes),
            ..Default::default()
        },
        Steer::Thrust(t) => TickInput {
            thrust: Some(t),
            ..Default::default()
        },
        Steer::Autopilot => TickInput {
            autopilot: true,
            ..Default::default()
        },
        Steer::Idle => TickInput::default(),
    }
}

fn check_run(case: &Case) -> Result<(), TestCaseError> {
    let config = EngineConfig {
        seed: case.seed,
        lanes: case.lanes,
        max_active_carriers: case.max_active,
        cooldown_range: case.cooldown,
        lives_start: case.lives,
        game_over_delay: case.delay,
        policy: if case.weighted {
            SelectionPolicy::Weighted
        } else {
            SelectionPolicy::Shuffle
        },
        playfield: Playfield {
            axis: if case.left {
                TravelAxis::Left
            } else {
                TravelAxis::Down
            },
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine = Engine::new(config).unwrap();
    engine.start(bank(case.correct)).unwrap();

    let mut now = 0.0f32;
    let mut prev_lives = case.lives;
    let mut scored_cycles = HashSet::new();
    // carrier id -> lane, for carriers active in the previous frame
    let mut active_before: HashMap<u32, usize> = HashMap::new();
    let mut seen: HashSet<u32> = HashSet::new();
    let mut last_consumed: HashMap<usize, f32> = HashMap::new();
    let mut without_correct = 0.0f32;
    let mut pending_since: Option<f32> = None;

    let frames = case.steering.len() * FRAMES_PER_STEP;
    for frame in 0..frames {
        let input = input_for(&case.steering[frame / FRAMES_PER_STEP], case.lanes);
        let dt = case.dts[frame % case.dts.len()];
        let snap = engine.tick_with(dt, &input);
        now += dt;

        // Lives never grow and never underflow
        prop_assert!(snap.lives <= prev_lives);
        prev_lives = snap.lives;

        // At most one scoring event per question cycle
        for event in &snap.events {
            if let GameEvent::CorrectAnswer { cycle, .. } = event {
                prop_assert!(scored_cycles.insert(*cycle), "cycle {} scored twice", cycle);
            }
        }

        // Density cap, except for a forced correct carrier
        let active: Vec<_> = snap.carriers.iter().filter(|c| c.is_active()).collect();
        let forced = active.iter().filter(|c| c.forced).count();
        prop_assert!(forced <= 1);
        prop_assert!(active.len() <= case.max_active + forced);

        // Cooldown respected between consecutive carriers of a lane
        for carrier in &snap.carriers {
            if seen.insert(carrier.id) {
                if let Some(&consumed) = last_consumed.get(&carrier.lane) {
                    prop_assert!(
                        now - consumed >= case.cooldown.0 - 1e-3,
                        "lane {} respawned after {}s",
                        carrier.lane,
                        now - consumed
                    );
                }
                if carrier.state != CarrierState::Active {
                    last_consumed.insert(carrier.lane, now);
                }
            }
        }
        for (&id, &lane) in &active_before {
            let still_active = snap.carriers.iter().any(|c| c.id == id && c.is_active());
            if !still_active {
                last_consumed.insert(lane, now);
            }
        }
        active_before = active.iter().map(|c| (c.id, c.lane)).collect();

        // Delayed game over
        if snap.pending_game_over && pending_since.is_none() {
            prop_assert_eq!(snap.lives, 0);
            prop_assert!(!snap.is_over, "game over never lands on the fatal frame");
            pending_since = Some(now);
        }
        if snap.is_over {
            let since = pending_since.expect("game over is always preceded by pending");
            let waited = now - since;
            prop_assert!(waited >= case.delay - 1e-3, "waited {}", waited);
            prop_assert!(waited < case.delay + 0.034, "waited {}", waited);
            break;
        }

        // Liveness: the correct answer is never absent for longer than a cooldown
        if snap.pending_game_over {
            without_correct = 0.0;
        } else if active.iter().any(|c| c.is_correct && c.cycle == snap.cycle) {
            without_correct = 0.0;
        } else {
            without_correct += dt;
            prop_assert!(
                without_correct <= case.cooldown.1 + 0.034,
                "no correct carrier for {}s",
                without_correct
            );
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn engine_rules_hold(case in case()) {
        check_run(&case)?;
    }
}
