//! Simulation constants and tuning parameters.

// --- Geometry ---

/// Edge length of one tile in screen pixels at zoom 1.0.
pub const TILE_SIZE: f64 = 32.0;

/// Castle footprint in tiles.
pub const CASTLE_SIZE: (i32, i32) = (3, 2);

/// Castle hit points.
pub const CASTLE_HP: i32 = 10_000;

// --- Map ---

/// Time scale applied to an enemy standing on a water tile.
pub const WATER_TIME_SCALE: f64 = 0.5;

/// Delay added between consecutive intro animations during population (seconds).
pub const INTRO_STAGGER_SECS: f64 = 0.02;

/// Attempts at finding a free edge tile before accepting an occupied one.
pub const SPAWN_RETRY_LIMIT: u32 = 100;

// --- Waves ---

/// Intermission before the very first wave (seconds).
pub const FIRST_WAVE_TIMEOUT: f64 = 60.0;

/// Intermission after a cleared wave (seconds).
pub const WAVE_RESET_TIMEOUT: f64 = 30.0;

/// Randomized delay between two spawns of an active wave (seconds).
pub const SPAWN_INTERVAL_MIN: f64 = 0.3;
pub const SPAWN_INTERVAL_MAX: f64 = 1.5;

// --- Animation ---

/// Wobble applied to an object that takes damage.
pub const OBJECT_HIT_KICK: f64 = 1.2;

/// Wobble applied to a clicked object while the cursor is cooling down.
pub const OBJECT_BLOCKED_KICK: f64 = 0.4;

/// Recoil wobble applied to a tower when it fires.
pub const TOWER_RECOIL_KICK: f64 = 0.5;

/// Wobble applied to an enemy that takes damage.
pub const ENEMY_HIT_KICK: f64 = 1.0;

/// Phase advance of the wobble sine per second.
pub const WOBBLE_FREQUENCY: f64 = 25.0;

/// Fade-in rate of the hover popup (keys per second).
pub const POPUP_FADE_RATE: f64 = 3.0;

/// Smoothness of the HUD counters.
pub const COUNTER_SMOOTHNESS: f64 = 8.0;

// --- Cursor ---

/// Click damage before any upgrade.
pub const CURSOR_BASE_DAMAGE: i32 = 1;

/// Cooldown between clicks before any upgrade (seconds).
pub const CURSOR_BASE_COOLDOWN: f64 = 1.0;

/// Floor for the click cooldown after upgrades (seconds).
pub const CURSOR_MIN_COOLDOWN: f64 = 0.1;

/// Seconds the primary button must be held over a sellable object.
pub const SELL_HOLD_SECS: f64 = 1.0;

// --- Landmine ---

/// Inclusive damage roll of a landmine explosion.
pub const LANDMINE_DAMAGE: (i32, i32) = (25, 50);

// --- Camera ---

/// Held-key camera pan speed (pixels per second).
pub const CAMERA_PAN_SPEED: f64 = 400.0;

/// Zoom limits and per-notch step.
pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.1;

// --- Cheats ---

/// Typed characters remembered while matching cheat codes.
pub const CHEAT_BUFFER_LEN: usize = 16;

/// Currency granted by the currency cheats.
pub const CHEAT_CURRENCY_GRANT: u32 = 1000;
