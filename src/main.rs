fn main() {
  if let Err(e) = lift_progression_lib::run() {
    eprintln!("lift-progression: {}", e);
    std::process::exit(1);
  }
}
