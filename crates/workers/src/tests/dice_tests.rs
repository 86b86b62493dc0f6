use rand::{rngs::mock::StepRng, rngs::StdRng, SeedableRng};
use shared::{
    codec::decode_roll_result,
    protocol::{DiceOperator, MAX_DICE_FACES},
};

use super::*;

#[test]
fn unmodified_rolls_stay_within_faces() {
    let mut worker = DiceWorker::seeded(7);
    for faces in [1, 2, 6, 20, 100, MAX_DICE_FACES] {
        let roll = DiceRoll::new(faces).expect("roll");
        for _ in 0..200 {
            let result = worker.roll(roll);
            assert!(
                (1..=i64::from(faces)).contains(&result),
                "d{faces} rolled {result}"
            );
        }
    }
}

#[test]
fn zero_faced_die_rolls_zero() {
    let mut worker = DiceWorker::seeded(1);
    assert_eq!(worker.roll(DiceRoll::new(0).expect("roll")), 0);
}

#[test]
fn one_faced_die_plus_modifier_is_exact() {
    let mut worker = DiceWorker::seeded(3);
    let roll = DiceRoll::new(1)
        .and_then(|roll| roll.with_modifier(DiceOperator::Add, 10_000))
        .expect("roll");
    assert_eq!(worker.roll(roll), 10_001);
}

#[test]
fn modifier_is_applied_to_the_same_base_roll_without_clamping() {
    let plain = DiceRoll::new(20).expect("roll");
    let minus = plain
        .with_modifier(DiceOperator::Subtract, 50)
        .expect("roll");

    let mut unmodified = DiceWorker::with_rng(StdRng::seed_from_u64(42));
    let mut modified = DiceWorker::with_rng(StdRng::seed_from_u64(42));
    for _ in 0..50 {
        let base = unmodified.roll(plain);
        assert_eq!(modified.roll(minus), base - 50);
    }
}

#[test]
fn reply_is_big_endian_integer() {
    let mut worker = DiceWorker::with_rng(StepRng::new(0, 0));
    let roll = DiceRoll::new(6)
        .and_then(|roll| roll.with_modifier(DiceOperator::Subtract, 4))
        .expect("roll");

    let Step::Reply(reply) = worker.handle(DiceRequest::Roll(roll)) else {
        panic!("roll must not stop the worker");
    };
    assert_eq!(reply.len(), 8);
    let value = decode_roll_result(&reply).expect("decode");
    assert!((-3..=2).contains(&value));
}

#[test]
fn shutdown_is_acknowledged_with_empty_frame() {
    let mut worker = DiceWorker::seeded(0);
    assert_eq!(
        worker.handle_frame(br#"{"option": 0, "n": null, "operation": null, "m": null}"#),
        Step::Shutdown(Vec::new())
    );
}
