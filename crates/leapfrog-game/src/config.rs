//! Fixed rules constants and settings validation.

use leapfrog_protocol::GameSettings;

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

/// Gold every player starts a game with.
pub const INITIAL_GOLD: i32 = 5;

/// Gold paid to the player who moves a frog.
pub const MOVE_REWARD: i32 = 1;

/// Gold paid to a spectator tile's owner when it catches a frog.
pub const SPECTATOR_TILE_FEE: i32 = 1;

/// Leg bets generated per forward frog at the start of every round.
pub const LEG_BETS_PER_FROG: usize = 5;

/// What a leg bet pays when its frog finishes the leg outside the top two.
pub const LEG_BET_LOSS: i32 = -1;

/// Overall-bet payouts for correct bets, indexed by the bet's claim order
/// among all bets of its kind, right or wrong. Claims past the end get the
/// last entry.
pub const OVERALL_BET_PAYOUTS: [i32; 5] = [8, 5, 3, 2, 1];

/// Gold lost by a wrong overall bet.
pub const OVERALL_BET_STAKE: i32 = 1;

// ---------------------------------------------------------------------------
// Frogs
// ---------------------------------------------------------------------------

/// Move magnitudes for frogs racing towards the finish.
pub const FORWARD_MOVES: [i32; 3] = [1, 2, 3];

/// Move magnitudes for frogs racing back towards the start.
pub const BACKWARD_MOVES: [i32; 3] = [-1, -2, -3];

pub const FROG_NAMES: [&str; 19] = [
    "Sir Hoppington",
    "Croak-a-Cola",
    "Ribbena",
    "Froggie Mercury",
    "The Kerminator",
    "Warty McFlop",
    "Sir Croaksalot",
    "Toadsworth",
    "Frogzilla",
    "Hoppy Potter",
    "James Pond",
    "Frogustine",
    "Froggernaut",
    "Lord Toadington",
    "Froggo",
    "Yoda",
    "Pepe",
    "Prince Charming",
    "Frogalicious",
];

pub const FROG_COLORS: [&str; 15] = [
    "#2F4F4F", "#E1AD01", "#4F7942", "#A0522D", "#483D8B", "#006400", "#4B5320", "#2E4053",
    "#784212", "#4A4A4A", "#6B4226", "#5D8AA8", "#6699CC", "#8E44AD", "#A04000",
];

// ---------------------------------------------------------------------------
// Settings bounds
// ---------------------------------------------------------------------------

/// Shortest track that keeps a seeded forward frog off the finish tile.
pub const MIN_TILES: usize = FORWARD_MOVES[2] as usize + 2;

pub const MAX_TILES: usize = 64;

/// Checks that `settings` describe a race this engine can build.
///
/// Frogs draw names and colors without replacement, so the smaller of the
/// two pools caps the frog count.
pub fn validate_settings(settings: &GameSettings) -> Result<(), String> {
    if !(MIN_TILES..=MAX_TILES).contains(&settings.num_tiles) {
        return Err(format!(
            "num_tiles must be between {MIN_TILES} and {MAX_TILES}, got {}",
            settings.num_tiles
        ));
    }
    if settings.num_forward_frogs == 0 {
        return Err("at least one forward frog is required".into());
    }
    let max_frogs = FROG_NAMES.len().min(FROG_COLORS.len());
    if settings.total_frogs() > max_frogs {
        return Err(format!(
            "at most {max_frogs} frogs are supported, got {}",
            settings.total_frogs()
        ));
    }
    if settings.frogs_per_round == 0 || settings.frogs_per_round > settings.total_frogs() {
        return Err(format!(
            "frogs_per_round must be between 1 and {}, got {}",
            settings.total_frogs(),
            settings.frogs_per_round
        ));
    }
    Ok(())
}
