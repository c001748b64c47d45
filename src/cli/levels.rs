//! Level table command

use bizquest::gamification::Level;

/// Print the point threshold of every level up to `up_to`
pub fn levels_command(up_to: u32) {
    println!("Level  Points");
    for level in 1..=up_to.max(1) {
        let threshold = Level::threshold(level);
        // Level 7 has no points of its own
        if Level::for_points(threshold) != level {
            println!("{:>5}  (skipped)", level);
            continue;
        }
        println!("{:>5}  {}", level, threshold);
    }
}
