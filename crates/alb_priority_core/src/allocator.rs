//! Randomized allocation of ALB listener rule priorities.
//!
//! Candidates are drawn uniformly from a fixed range until one is found that is
//! neither configured on the listener nor already handed out earlier in the
//! same invocation. The listener's current rules are the only source of truth
//! for committed priorities; the [`AllocationContext`] only prevents a single
//! batch from returning duplicates.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use rand::Rng;

pub const PRIORITY_RANGE_MIN: u32 = 10_000;
pub const PRIORITY_RANGE_MAX: u32 = 50_000;
pub const PRIORITY_SEPARATOR: &str = ",";

pub fn priority_range() -> RangeInclusive<u32> {
    PRIORITY_RANGE_MIN..=PRIORITY_RANGE_MAX
}

/// Read-only view of the priorities currently configured on a listener.
pub trait RulePrioritySource {
    fn rule_priorities(&self, listener_arn: &str) -> Result<Vec<String>, String>;
}

/// Source of candidate priorities.
pub trait PriorityDraw {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32;
}

#[derive(Debug, Clone)]
pub struct RandomDraw<R> {
    rng: R,
}

impl<R: Rng> RandomDraw<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> PriorityDraw for RandomDraw<R> {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }
}

/// Priorities claimed during one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationContext {
    in_flight: BTreeSet<String>,
}

impl AllocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, priority: &str) -> bool {
        self.in_flight.contains(priority)
    }

    pub fn claim(&mut self, priority: String) {
        self.in_flight.insert(priority);
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn claimed(&self) -> impl Iterator<Item = &str> {
        self.in_flight.iter().map(String::as_str)
    }
}

/// Keeps only plain decimal priorities; the listener's `default` rule and any
/// other sentinel never collide with a drawn candidate.
pub fn in_use_priorities(raw: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    raw.into_iter()
        .filter(|priority| !priority.is_empty() && priority.bytes().all(|b| b.is_ascii_digit()))
        .collect()
}

pub fn allocate_priority(
    listener_arn: &str,
    rules: &dyn RulePrioritySource,
    draw: &mut dyn PriorityDraw,
    context: &mut AllocationContext,
) -> Result<String, String> {
    let in_use = in_use_priorities(rules.rule_priorities(listener_arn)?);

    // Unbounded: a listener close to 40001 rules would spin here.
    loop {
        let candidate = draw.draw(priority_range()).to_string();
        if !in_use.contains(&candidate) && !context.contains(&candidate) {
            context.claim(candidate.clone());
            return Ok(candidate);
        }
    }
}

/// Allocates `count` priorities for one listener, sorted as strings.
/// No capacity is reserved for `count`; it arrives unchecked from the request.
pub fn allocate_priorities(
    listener_arn: &str,
    count: usize,
    rules: &dyn RulePrioritySource,
    draw: &mut dyn PriorityDraw,
    context: &mut AllocationContext,
) -> Result<Vec<String>, String> {
    let mut priorities = Vec::new();
    for _ in 0..count {
        priorities.push(allocate_priority(listener_arn, rules, draw, context)?);
    }
    priorities.sort();
    Ok(priorities)
}

pub fn join_priorities(priorities: &[String]) -> String {
    priorities.join(PRIORITY_SEPARATOR)
}
