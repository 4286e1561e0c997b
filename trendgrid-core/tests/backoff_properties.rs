//! Property tests for the retry executor.
//!
//! Uses proptest to verify:
//! 1. Jitter bounds: a jittered delay stays within [0.5, 1.5] of its base
//! 2. Delay growth: the un-jittered delay never shrinks and never exceeds max
//! 3. Rate-limit delays stay within [wait, wait + jitter]
//! 4. Attempt accounting: k failures before success cost exactly k sleeps

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::time::Duration;
use trendgrid_core::backoff::{
    AttemptOutcome, Cancelled, Classify, FailureClass, RetryError, RetryPolicy,
};

#[derive(Debug)]
struct Failure {
    throttled: bool,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.throttled { "429" } else { "reset" })
    }
}

impl Classify for Failure {
    fn failure_class(&self) -> FailureClass {
        if self.throttled {
            FailureClass::RateLimited
        } else {
            FailureClass::Transient
        }
    }
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_policy() -> impl Strategy<Value = RetryPolicy> {
    (1u32..8, 1u64..5_000, 0u64..120_000).prop_map(|(retries, base_ms, extra_ms)| {
        RetryPolicy::new(
            retries,
            Duration::from_millis(base_ms),
            Duration::from_millis(base_ms + extra_ms),
        )
        .unwrap()
    })
}

fn arb_unit() -> impl Strategy<Value = f64> {
    0.0..1.0_f64
}

// ── 1. Jitter bounds ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn jittered_delay_within_half_and_one_and_a_half(
        policy in arb_policy(),
        attempt in 0u32..8,
        unit in arb_unit(),
    ) {
        let base = policy.backoff_delay(attempt);
        let jittered = RetryPolicy::jittered(base, unit);
        prop_assert!(jittered >= base.mul_f64(0.5));
        prop_assert!(jittered <= base.mul_f64(1.5));
    }
}

// ── 2. Delay growth ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn backoff_is_non_decreasing_and_capped(policy in arb_policy(), attempt in 0u32..64) {
        let now = policy.backoff_delay(attempt);
        let next = policy.backoff_delay(attempt + 1);
        prop_assert!(now <= next);
        prop_assert!(next <= policy.max_delay());
    }
}

// ── 3. Rate-limit delays ─────────────────────────────────────────────

proptest! {
    #[test]
    fn rate_limit_delay_within_wait_plus_jitter(
        wait_ms in 0u64..10_000,
        jitter_ms in 0u64..5_000,
        unit in arb_unit(),
    ) {
        let wait = Duration::from_millis(wait_ms);
        let jitter = Duration::from_millis(jitter_ms);
        let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(60))
            .unwrap()
            .with_rate_limit_wait(wait, jitter);
        let delay = policy.rate_limit_delay(unit);
        prop_assert!(delay >= wait);
        prop_assert!(delay <= wait + jitter);
    }
}

// ── 4. Attempt accounting ────────────────────────────────────────────

proptest! {
    #[test]
    fn failures_before_success_cost_one_sleep_each(
        policy in arb_policy(),
        failures in 0u32..10,
        throttled in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sleeps: Vec<Duration> = Vec::new();
        let mut calls = 0u32;

        let result = policy.execute(
            &mut rng,
            &mut |d: Duration| -> Result<(), Cancelled> {
                sleeps.push(d);
                Ok(())
            },
            || {
                calls += 1;
                if calls <= failures {
                    Err(Failure { throttled })
                } else {
                    Ok(calls)
                }
            },
        );

        let max = policy.max_retries();
        if failures < max {
            let retried = result.unwrap();
            prop_assert_eq!(retried.value, failures + 1);
            prop_assert_eq!(retried.attempts.len() as u32, failures + 1);
            prop_assert_eq!(sleeps.len() as u32, failures);
            prop_assert_eq!(retried.attempts.last().unwrap().outcome, AttemptOutcome::Success);
        } else {
            let err = result.unwrap_err();
            let exhausted = matches!(err, RetryError::Exhausted { .. });
            prop_assert!(exhausted, "expected an exhausted error, got {:?}", err);
            prop_assert_eq!(err.attempts().len() as u32, max);
            prop_assert_eq!(calls, max);
            prop_assert_eq!(sleeps.len() as u32, max - 1);
        }

        // recorded delays match what was slept
        let recorded: Vec<Duration> = match &policy.execute(
            &mut StdRng::seed_from_u64(seed),
            &mut |_: Duration| -> Result<(), Cancelled> { Ok(()) },
            || -> Result<(), Failure> { Err(Failure { throttled }) },
        ) {
            Err(e) => e.attempts().iter().map(|a| a.delay_used).collect(),
            Ok(_) => unreachable!(),
        };
        prop_assert_eq!(recorded.len() as u32, max);
        prop_assert_eq!(*recorded.last().unwrap(), Duration::ZERO);
    }
}
