use std::io::{self, Write};

use rand::Rng;

use super::model::{Mode, StackModel};
use super::Generate;

/// Settings for simple-format generation.
///
/// All fields have sensible defaults; construct with
/// `stacks::Options::default()` and adjust as needed.
#[derive(Clone, Debug)]
pub struct Options {
    /// Composition of non-hot stacks.
    pub mode: Mode,

    /// Fraction of samples drawn from the hot-path catalog. Must be within
    /// `[0, 1]`.
    pub hot_ratio: f64,

    /// Deepest stack to generate [default: 10, or 8 in simple mode].
    pub max_depth: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            mode: Mode::Realistic,
            hot_ratio: 0.3,
            max_depth: None,
        }
    }
}

/// A simple-format sample generator.
///
/// Each sample block is one frame name per line, root frame first, followed
/// by a single blank line. Frame names are plain identifiers drawn from the
/// model's pools, so no escaping is ever needed.
///
/// To construct one, either use `stacks::Generator::default()` or create an
/// [`Options`] and use `stacks::Generator::from(options)`.
pub struct Generator {
    model: StackModel,
}

impl From<Options> for Generator {
    fn from(opt: Options) -> Self {
        let mut model = StackModel::new(opt.mode, opt.hot_ratio);
        if let Some(depth) = opt.max_depth {
            model.max_depth = depth;
        }
        Generator { model }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Generator::from(Options::default())
    }
}

impl Generate for Generator {
    fn sample<R, W>(&mut self, rng: &mut R, writer: &mut W) -> io::Result<()>
    where
        R: Rng,
        W: Write,
    {
        for frame in self.model.stack(rng) {
            writer.write_all(frame.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.write_all(b"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn sample_is_one_block_of_frame_lines() {
        let mut generator = Generator::from(Options {
            mode: Mode::Simple,
            hot_ratio: 0.0,
            max_depth: None,
        });
        let mut rng = SmallRng::seed_from_u64(11);
        let mut out = Vec::new();
        generator.sample(&mut rng, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("\n\n"));
        let frames: Vec<_> = text.trim_end().lines().collect();
        assert!(frames.len() >= 2 && frames.len() <= 8);
        assert!(frames.iter().all(|f| !f.is_empty()));
    }

    #[test]
    fn max_depth_override_is_respected() {
        let mut generator = Generator::from(Options {
            mode: Mode::Simple,
            hot_ratio: 0.0,
            max_depth: Some(4),
        });
        let mut rng = SmallRng::seed_from_u64(12);
        for _ in 0..500 {
            let mut out = Vec::new();
            generator.sample(&mut rng, &mut out).unwrap();
            let depth = out.split(|&b| b == b'\n').filter(|l| !l.is_empty()).count();
            assert!(depth <= 4, "depth {}", depth);
        }
    }
}
