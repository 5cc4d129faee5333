//! Display-name generator for demo accounts.

use std::sync::LazyLock;

static COLORS: &[&str] = &[
    "Amber", "Azure", "Cobalt", "Coral", "Crimson", "Emerald", "Golden", "Indigo", "Ivory", "Jade",
    "Onyx", "Pearl", "Ruby", "Scarlet", "Silver", "Violet",
];

static CREATURES: &[&str] = &[
    "Badger", "Cobra", "Dragon", "Falcon", "Fox", "Gecko", "Jaguar", "Kraken", "Lynx", "Mantis",
    "Otter", "Panther", "Phoenix", "Raptor", "Scarab", "Serpent", "Tiger", "Viper", "Wolf",
    "Wyvern",
];

static RNG: LazyLock<std::sync::Mutex<SimpleRng>> = LazyLock::new(|| {
    // Seed from current time
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    std::sync::Mutex::new(SimpleRng::new(seed))
});

/// Simple xorshift64 RNG - demo names don't need cryptographic randomness.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Generate a demo display name like "Crimson Fox".
pub fn generate_name() -> String {
    let mut rng = RNG.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let color = COLORS[rng.next() as usize % COLORS.len()];
    let creature = CREATURES[rng.next() as usize % CREATURES.len()];
    format!("{} {}", color, creature)
}
