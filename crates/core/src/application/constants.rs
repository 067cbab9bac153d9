// Application constants (no magic values)
use std::time::Duration;

/// Default number of attempts for the retry stage
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default pause between two retry attempts (1s)
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Every user row, in table order
pub const SELECT_ALL_USERS_SQL: &str = "SELECT * FROM users";

/// One user by primary key
pub const SELECT_USER_BY_ID_SQL: &str = "SELECT * FROM users WHERE id = ?";

/// Change one user's email (params: email, id)
pub const UPDATE_USER_EMAIL_SQL: &str = "UPDATE users SET email = ? WHERE id = ?";
