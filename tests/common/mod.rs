#![allow(dead_code)]

use adaptive_testing_engine::{
    Advance, Engine, EngineConfig, Item, Outcome, Response, TerminationCriteria,
};
use chrono::{DateTime, TimeZone, Utc};

pub const FIXED_TIMESTAMP: i64 = 1700000000000;

pub fn fixed_time(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(FIXED_TIMESTAMP + offset_secs * 1000)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn identical_items(count: usize, discrimination: f64, difficulty: f64) -> Vec<Item> {
    (0..count)
        .map(|i| Item::new(format!("q{i:02}"), discrimination, difficulty))
        .collect()
}

pub fn config(min_questions: usize, max_questions: usize) -> EngineConfig {
    EngineConfig {
        termination: TerminationCriteria {
            min_questions,
            max_questions,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Starts a session and answers one item per entry of `answers`, stopping
/// early if the engine terminates. Returns every step, the initial one first.
pub fn drive(engine: &Engine, answers: &[bool]) -> Vec<Advance> {
    let first = engine.advance(&engine.start_session(), None).unwrap();
    let mut steps = vec![first];

    for (i, &correct) in answers.iter().enumerate() {
        let last = steps.last().unwrap();
        let item_id = match &last.outcome {
            Outcome::NextItem(item) => item.id.clone(),
            Outcome::Terminated { .. } => break,
        };
        let response = Response::at(item_id, correct, fixed_time(i as i64));
        let next = engine.advance(&last.session, Some(response)).unwrap();
        steps.push(next);
    }

    steps
}
