use kindling::generate::Generate;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Generates a whole dataset into memory with a seeded random source.
pub fn generate_to_string<G: Generate>(generator: &mut G, seed: u64, samples: usize) -> String {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut out = Vec::new();
    generator.generate(&mut rng, samples, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Splits dataset text into its blank-line-terminated sample blocks, each a
/// list of lines.
pub fn blocks(dataset: &str) -> Vec<Vec<&str>> {
    dataset
        .split_terminator("\n\n")
        .map(|block| block.lines().collect())
        .collect()
}
