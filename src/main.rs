//! Quiz Arcade headless runner
//!
//! Plays a run on autopilot and logs what happens. Rendering and input are
//! supplied by the host application; this binary exercises the engine alone.
//!
//! Usage: `quiz-arcade [bank.json] [config.json] [seconds] [low|medium|high]`

#[cfg(not(target_arch = "wasm32"))]
const SAMPLE_BANK: &str = r#"[
    { "prompt": "7 x 8", "answers": ["54", "56", "64", "48"], "correct_index": 1 },
    { "prompt": "Largest planet", "answers": ["Mars", "Venus", "Jupiter", "Saturn"], "correct_index": 2 },
    { "prompt": "H2O is", "answers": ["Water", "Salt", "Sugar", "Air"], "correct_index": 0 },
    { "prompt": "Square root of 81", "answers": ["7", "8", "10", "9"], "correct_index": 3 }
]"#;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Quiz Arcade (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use quiz_arcade::sim::load_bank;
    use quiz_arcade::{Engine, EngineConfig, GameEvent, QualityPreset, TickInput};

    let args: Vec<String> = std::env::args().skip(1).collect();

    let bank = match args.first() {
        Some(path) => load_bank(&std::fs::read_to_string(path)?)?,
        None => load_bank(SAMPLE_BANK)?,
    };
    let mut config = match args.get(1) {
        Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let seconds: f32 = match args.get(2) {
        Some(s) => s.parse()?,
        None => 60.0,
    };
    if let Some(name) = args.get(3) {
        let preset = QualityPreset::parse(name)
            .ok_or_else(|| format!("unknown quality preset {name:?}"))?;
        config.feedback.apply_preset(preset);
        log::info!("Feedback quality: {preset:?}");
    }

    let mut engine = Engine::new(config)?;
    engine.start(bank)?;

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let dt = 1.0 / 60.0;
    let frames = (seconds / dt).ceil() as u32;
    let mut correct = 0u32;
    let mut wrong = 0u32;

    for frame in 0..frames {
        let snap = engine.tick_with(dt, &input);
        for event in &snap.events {
            match event {
                GameEvent::QuestionChanged { .. } => {
                    if let Some(q) = &snap.question {
                        log::info!("Q{}: {}", snap.cycle, q.prompt);
                    }
                }
                GameEvent::CorrectAnswer { answer_index, .. } => {
                    correct += 1;
                    log::info!("  correct: answer {answer_index} (score {})", snap.score);
                }
                GameEvent::WrongAnswer {
                    answer_index,
                    lives_left,
                    ..
                } => {
                    wrong += 1;
                    log::info!("  wrong: answer {answer_index} ({lives_left} lives left)");
                }
                GameEvent::GameOverPending => log::info!("  last life lost"),
                GameEvent::GameOver { score } => {
                    log::info!("Game over at frame {frame} with score {score}");
                }
            }
        }
        if snap.is_over {
            break;
        }
    }

    println!(
        "score: {}  lives: {}  correct: {correct}  wrong: {wrong}  best streak: {}",
        engine.score(),
        engine.lives(),
        engine.scoreboard().best_streak
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The engine is driven by the host page on wasm
}
