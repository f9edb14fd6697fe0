use once_cell::sync::Lazy;
use rand::Rng;

/// Process entry points and teardown, the usual bottom of a userspace stack.
pub static SYSTEM_FUNCS: &[&str] = &["main", "__libc_start_main", "_start", "exit"];

/// Application-tier function names, the middle of a realistic stack.
pub static APPLICATION_FUNCS: &[&str] = &[
    "process_request",
    "handle_connection",
    "parse_data",
    "compute_result",
    "execute_query",
    "render_response",
    "validate_input",
    "serialize_output",
    "load_config",
    "init_database",
    "cleanup_resources",
    "log_event",
];

/// Libc-flavored leaf functions.
pub static LIBRARY_FUNCS: &[&str] = &[
    "malloc", "free", "memcpy", "strlen", "strcmp", "printf", "fprintf", "fopen", "fclose",
    "read", "write", "socket", "bind", "listen", "accept",
];

/// Filler names used to pad stacks out to their target depth.
pub static MISC_FUNCS: &[&str] = &[
    "foo", "bar", "baz", "qux", "alpha", "beta", "gamma", "delta", "func_a", "func_b", "func_c",
    "helper_1", "helper_2", "util_func",
];

/// The hot-path catalog: hand-authored call paths that recur at high
/// frequency so that downstream collapse stages have real merging to do.
///
/// A generator that drew every stack uniformly would produce almost no
/// repeated stacks at realistic sample counts.
pub static HOT_PATHS: &[&[&str]] = &[
    &["main", "process_request", "execute_query", "malloc"],
    &["main", "handle_connection", "read", "memcpy"],
    &["main", "render_response", "serialize_output", "printf"],
    &["_start", "__libc_start_main", "main", "compute_result", "foo", "bar"],
    &["main", "parse_data", "validate_input", "strcmp"],
];

static ALL_FUNCS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut all = Vec::new();
    all.extend_from_slice(SYSTEM_FUNCS);
    all.extend_from_slice(APPLICATION_FUNCS);
    all.extend_from_slice(LIBRARY_FUNCS);
    all.extend_from_slice(MISC_FUNCS);
    all
});

// Empirically chosen defaults, kept as constants rather than API surface.
// Only `hot_ratio`, `mode`, and the depth range are runtime knobs.
const SYSTEM_ODDS: f64 = 0.7;
const HOT_EXTEND_ODDS: f64 = 0.3;

/// One probabilistic layer of a realistic stack: with probability `odds`,
/// contribute between `min` and `max` frames from `pool`, capped by however
/// much of the depth budget is left.
struct Segment {
    odds: f64,
    pool: &'static [&'static str],
    min: usize,
    max: usize,
}

/// The layers of a realistic stack, in root-to-leaf order. A skipped
/// segment's budget passes to the next one; whatever remains after the last
/// segment is padded with misc frames.
static SEGMENTS: &[Segment] = &[
    Segment {
        odds: 0.5,
        pool: APPLICATION_FUNCS,
        min: 1,
        max: 3,
    },
    Segment {
        odds: 0.6,
        pool: LIBRARY_FUNCS,
        min: 1,
        max: 2,
    },
];

impl Segment {
    /// Draws this segment's frames into `stack`, consuming at most `budget`
    /// slots. Returns the number of frames contributed.
    fn fill<R: Rng>(&self, rng: &mut R, budget: usize, stack: &mut Vec<&'static str>) -> usize {
        if budget == 0 || !rng.gen_bool(self.odds) {
            return 0;
        }
        let take = std::cmp::min(budget, rng.gen_range(self.min..=self.max));
        for _ in 0..take {
            stack.push(choice(self.pool, rng));
        }
        take
    }
}

fn choice<R: Rng>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool[rng.gen_range(0..pool.len())]
}

/// How non-hot stacks are composed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Layered stacks whose shape (system → application → library → filler)
    /// resembles real execution traces.
    Realistic,
    /// Flat uniform draws from the union of all pools; cheap, low-structure
    /// datasets.
    Simple,
}

/// A stochastic model of call-stack shapes.
///
/// Each call to [`stack`](StackModel::stack) is an independent draw: with
/// probability [`hot_ratio`](StackModel::hot_ratio) the stack comes from the
/// fixed [`HOT_PATHS`] catalog (possibly extended with a few misc frames),
/// otherwise it is composed per the configured [`Mode`] with a uniformly
/// drawn target depth in `[min_depth, max_depth]`.
///
/// The model holds no mutable state and is deliberately non-deterministic:
/// all randomness comes from the `Rng` passed in, and reseeding for
/// reproducible output is the caller's responsibility.
#[derive(Clone, Debug)]
pub struct StackModel {
    /// Composition of non-hot stacks.
    pub mode: Mode,
    /// Shallowest stack to generate.
    pub min_depth: usize,
    /// Deepest stack to generate.
    pub max_depth: usize,
    /// Fraction of draws taken from the hot-path catalog.
    pub hot_ratio: f64,
}

impl StackModel {
    /// A model with the given mode's default depth range (realistic:
    /// `[3, 10]`, simple: `[2, 8]`).
    pub fn new(mode: Mode, hot_ratio: f64) -> Self {
        let (min_depth, max_depth) = match mode {
            Mode::Realistic => (3, 10),
            Mode::Simple => (2, 8),
        };
        StackModel {
            mode,
            min_depth,
            max_depth,
            hot_ratio,
        }
    }

    /// Draws one call stack, root frame first.
    pub fn stack<R: Rng>(&self, rng: &mut R) -> Vec<&'static str> {
        if rng.gen_bool(self.hot_ratio) {
            self.hot(rng)
        } else {
            match self.mode {
                Mode::Realistic => self.realistic(rng),
                Mode::Simple => self.flat(rng),
            }
        }
    }

    /// One stack from the hot-path catalog, extended with 1-3 misc frames a
    /// fraction of the time to simulate depth variance.
    fn hot<R: Rng>(&self, rng: &mut R) -> Vec<&'static str> {
        let path = HOT_PATHS[rng.gen_range(0..HOT_PATHS.len())];
        let mut stack = path.to_vec();
        if rng.gen_bool(HOT_EXTEND_ODDS) {
            let extra = rng.gen_range(1..=3);
            for _ in 0..extra {
                stack.push(choice(MISC_FUNCS, rng));
            }
        }
        stack
    }

    /// Layered composition: an optional system frame, then each segment in
    /// turn against the remaining depth budget, then misc padding. The stack
    /// always comes out exactly `depth` frames long.
    fn realistic<R: Rng>(&self, rng: &mut R) -> Vec<&'static str> {
        let depth = rng.gen_range(self.min_depth..=self.max_depth);
        let mut stack = Vec::with_capacity(depth);

        if rng.gen_bool(SYSTEM_ODDS) {
            stack.push(choice(SYSTEM_FUNCS, rng));
        }

        let mut budget = depth.saturating_sub(stack.len());
        for segment in SEGMENTS {
            budget -= segment.fill(rng, budget, &mut stack);
        }
        for _ in 0..budget {
            stack.push(choice(MISC_FUNCS, rng));
        }

        stack
    }

    fn flat<R: Rng>(&self, rng: &mut R) -> Vec<&'static str> {
        let depth = rng.gen_range(self.min_depth..=self.max_depth);
        (0..depth).map(|_| choice(&ALL_FUNCS, rng)).collect()
    }
}

impl Default for StackModel {
    fn default() -> Self {
        StackModel::new(Mode::Realistic, 0.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0xfeed)
    }

    #[test]
    fn realistic_depths_stay_in_range() {
        let model = StackModel::new(Mode::Realistic, 0.0);
        let mut rng = rng();
        for _ in 0..5000 {
            let stack = model.stack(&mut rng);
            assert!(stack.len() >= 3 && stack.len() <= 10, "depth {}", stack.len());
        }
    }

    #[test]
    fn simple_depths_stay_in_range() {
        let model = StackModel::new(Mode::Simple, 0.0);
        let mut rng = rng();
        for _ in 0..5000 {
            let stack = model.stack(&mut rng);
            assert!(stack.len() >= 2 && stack.len() <= 8, "depth {}", stack.len());
        }
    }

    #[test]
    fn simple_draws_from_the_pool_union() {
        let model = StackModel::new(Mode::Simple, 0.0);
        let mut rng = rng();
        for _ in 0..1000 {
            for frame in model.stack(&mut rng) {
                assert!(ALL_FUNCS.contains(&frame), "unexpected frame {}", frame);
            }
        }
    }

    #[test]
    fn hot_only_stacks_come_from_the_catalog() {
        let model = StackModel::new(Mode::Realistic, 1.0);
        let mut rng = rng();
        let longest = HOT_PATHS.iter().map(|p| p.len()).max().unwrap();
        for _ in 0..2000 {
            let stack = model.stack(&mut rng);
            assert!(stack.len() <= longest + 3);
            assert!(HOT_PATHS
                .iter()
                .any(|path| stack.len() >= path.len() && &stack[..path.len()] == *path));
            for frame in &stack {
                let known = HOT_PATHS.iter().any(|p| p.contains(frame))
                    || MISC_FUNCS.contains(frame);
                assert!(known, "unexpected frame {}", frame);
            }
        }
    }

    #[test]
    fn segments_never_overrun_their_budget() {
        let segment = Segment {
            odds: 1.0,
            pool: APPLICATION_FUNCS,
            min: 1,
            max: 3,
        };
        let mut rng = rng();
        for budget in 0..=3 {
            for _ in 0..100 {
                let mut stack = Vec::new();
                let took = segment.fill(&mut rng, budget, &mut stack);
                assert_eq!(took, stack.len());
                assert!(took <= budget);
            }
        }
    }

    #[test]
    fn skipped_segments_contribute_nothing() {
        let segment = Segment {
            odds: 0.0,
            pool: LIBRARY_FUNCS,
            min: 1,
            max: 2,
        };
        let mut rng = rng();
        let mut stack = Vec::new();
        assert_eq!(segment.fill(&mut rng, 5, &mut stack), 0);
        assert!(stack.is_empty());
    }

    #[test]
    fn pools_are_disjoint() {
        let pools = [SYSTEM_FUNCS, APPLICATION_FUNCS, LIBRARY_FUNCS, MISC_FUNCS];
        for (i, a) in pools.iter().enumerate() {
            for b in &pools[i + 1..] {
                for frame in *a {
                    assert!(!b.contains(frame), "{} appears in two pools", frame);
                }
            }
        }
    }
}
