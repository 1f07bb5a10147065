use crate::moves::magic::precompute::{MagicTableSeed, generate_magic_tables};
use crate::moves::magic::structs::MagicTables;

/// Default location for a baked magic-number table, used only with `load_magic`.
pub const DEFAULT_MAGIC_TABLE_PATH: &str = "magic_tables.bin";

/// Serializes `tables` to `path` with bincode, for later use with the `load_magic` feature.
pub fn save_magic_tables(tables: &MagicTables, path: &str) -> std::io::Result<()> {
    let bytes = bincode::serialize(tables)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(path, bytes)
}

#[cfg(feature = "load_magic")]
fn load_from_disk() -> MagicTables {
    let path =
        std::env::var("CORVUS_MAGIC_TABLE").unwrap_or_else(|_| DEFAULT_MAGIC_TABLE_PATH.to_string());
    let bytes = std::fs::read(&path).unwrap_or_else(|e| {
        panic!("load_magic is enabled but `{path}` could not be read: {e}")
    });
    bincode::deserialize(&bytes)
        .unwrap_or_else(|e| panic!("load_magic table at `{path}` is corrupt: {e}"))
}

#[cfg(not(feature = "load_magic"))]
fn search_from_scratch() -> MagicTables {
    #[cfg(feature = "deterministic_magic")]
    let seed = MagicTableSeed::Fixed(0xC0FF_EE00_1234_5678);
    #[cfg(not(feature = "deterministic_magic"))]
    let seed = MagicTableSeed::Random;

    generate_magic_tables(seed).expect("magic number search failed")
}

/// Produces the rook/bishop magic tables used for the rest of the process's lifetime.
/// With `load_magic`, reads a table baked by [`save_magic_tables`]; otherwise searches
/// for fresh magic multipliers (seeded deterministically under `deterministic_magic`).
pub fn load_magic_tables() -> MagicTables {
    #[cfg(feature = "load_magic")]
    {
        load_from_disk()
    }
    #[cfg(not(feature = "load_magic"))]
    {
        search_from_scratch()
    }
}
