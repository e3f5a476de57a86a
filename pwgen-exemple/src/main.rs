use pwgen_core::config::Settings;
use pwgen_core::random::{SeededRandom, SystemRandom};
use pwgen_core::registry::Registry;
use pwgen_core::session::{GenerationRequest, generate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Default settings: 20 characters, strength 3 (96 bits),
    // dictionary read from /usr/share/dict/words if it exists
    let mut settings = Settings::default();

    // Optional directory of user generators (*.json definitions)
    settings.user_generators_dir = Some("./generators".into());

    // Load the built-in generators and the user ones
    // Generators whose data cannot be loaded are skipped (see the logs)
    let registry = Registry::discover(&settings);

    // Generators are sorted by entropy per unit, strongest first
    for descriptor in registry.descriptors() {
        println!("{:>22} {:6.2} bits  {}", descriptor.id, descriptor.entropy, descriptor.description);
    }

    // Strength can be given in levels (1 level = 32 bits) or directly in bits
    // Each record is rated weak (<= 64 bits), okay or strong (>= 96 bits)
    let rng = SystemRandom;
    for record in generate(&registry, &GenerationRequest::strength("128b"), &settings, &rng)? {
        println!("{}: {} ({:.2} bits, {:?})", record.generator_name, record.password, record.entropy_bits, record.strength);
    }

    // Length mode: exact for character generators, at least the length for word generators
    let request = GenerationRequest::length("16").with_generators(["alphanumeric-clear", "pronounceable"]);
    for record in generate(&registry, &request, &settings, &rng)? {
        println!("{}: {} ({:.2} bits)", record.generator_name, record.password, record.entropy_bits);
    }

    // An empty value falls back to the settings
    let request = GenerationRequest::strength("").with_generators(["pronounceable-markov"]);
    for record in generate(&registry, &request, &settings, &rng)? {
        println!("{}: {} ({:.2} bits)", record.generator_name, record.password, record.entropy_bits);
    }

    // A seeded source gives the same passwords on every run (tests and demos only)
    let seeded = SeededRandom::new(42);
    let request = GenerationRequest::length("12").with_generators(["hex"]);
    for record in generate(&registry, &request, &settings, &seeded)? {
        println!("Seeded {}: {}", record.generator_name, record.password);
    }

    // Invalid or oversized values (more than 4096 characters or bits) are rejected before any generator runs
    match generate(&registry, &GenerationRequest::strength("strong"), &settings, &rng) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected: {e}"),
    }

    Ok(())
}
