//! Keys used in the durable local session store.
//!
//! Flat string values, no schema versioning. `ALL` is the set removed when
//! the backend rejects the stored token and the session must be discarded.

pub const AUTH_TOKEN: &str = "authToken";
pub const GURU_ID: &str = "guruId";
pub const CURRENT_LOGGED_GURU_ID: &str = "currentLoggedGuruId";
pub const SELECTED_MAGANG_ID: &str = "selectedMagangId";
pub const CURRENT_MAGANG_ID: &str = "currentMagangId";
pub const SELECTED_DUDIKA_ID: &str = "selectedDudikaId";

pub const ALL: [&str; 6] = [
    AUTH_TOKEN,
    GURU_ID,
    CURRENT_LOGGED_GURU_ID,
    SELECTED_MAGANG_ID,
    CURRENT_MAGANG_ID,
    SELECTED_DUDIKA_ID,
];
