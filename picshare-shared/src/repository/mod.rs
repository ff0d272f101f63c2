/// Repository layer
///
/// Business-level operations composed from the model queries.
///
/// - [`users`]: registration, lookups, token and profile updates

pub mod users;
