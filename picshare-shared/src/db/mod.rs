/// Database layer for PicShare
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Embedded, reversible schema migrations
/// - Models are in the `models` module at crate root level

pub mod migrations;
pub mod pool;
